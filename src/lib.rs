pub mod browser;
pub mod change_detector;
pub mod config;
pub mod crawl_engine;
pub mod engine;
pub mod monitor;
pub mod notifier;
pub mod session;
pub mod store;
pub mod summarizer;
pub mod utils;

pub use browser::{
    BrowserHandle, BrowsingContext, ChromiumContextFactory, ContextFactory, launch_browser,
};
pub use change_detector::{ChangeDetector, DiffResult};
pub use config::{EngineConfig, Settings};
pub use crawl_engine::{AggregatedDocument, CrawlError, PageCrawler};
pub use engine::{EngineError, MonitorOutcome, RunReport, WatchEngine, run_periodically};
pub use monitor::{CookiePayload, Monitor, NewMonitor, SessionCookie};
pub use notifier::{NotificationPayload, Notifier, WebhookNotifier};
pub use session::{SessionManager, SessionOutcome};
pub use store::{MonitorStore, MonitorUpdate, SqliteMonitorStore, StoreError};
pub use summarizer::{GeminiSummarizer, SummarizationGateway, Summarizer, SummaryRequest};
