//! Pre-render command: localizes a page snapshot the way the live page would.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::{
    ConfigError,
    ConfigManager,
    L10nSettings,
    TranslationSource,
};
use crate::dom::{
    MemoryDom,
    PageSnapshot,
};
use crate::l10n::{
    FileLocaleStore,
    FileTranslationLoader,
    GeoLocaleDetector,
    HttpGeoLookup,
    HttpTranslationLoader,
    InitOutcome,
    LanguageSwitcher,
    SwitcherSlot,
    TranslationLoader,
    initialize,
};
use crate::types::LocaleId;
use crate::ui::{
    LanguageDropdowns,
    MobileMenu,
};

pub const USAGE: &str = "\
site-l10n: localize a page snapshot

USAGE:
  site-l10n --page <FILE> --out <FILE> [OPTIONS]

OPTIONS:
  --root <DIR>       Project root holding .site-l10n.json [default: .]
  --page <FILE>      Page snapshot to localize (JSON)
  --out <FILE>       Where to write the localized snapshot
  --locale <ID>      Switch to this locale after initialization
  --offline          Skip geolocation and use the fallback locale
  -h, --help         Print help
";

/// Failures that abort a run.
#[derive(Error, Debug)]
pub enum CliError {
    /// Malformed or missing options.
    #[error("Invalid arguments: {0}")]
    Args(#[from] pico_args::Error),

    /// Leftover arguments.
    #[error("Unexpected arguments: {0:?}")]
    UnexpectedArgs(Vec<String>),

    /// Settings could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Page file could not be read.
    #[error("Failed to read page {path:?}: {source}")]
    ReadPage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page file is not a valid snapshot.
    #[error("Invalid page snapshot: {0}")]
    Page(#[from] serde_json::Error),

    /// Output file could not be written.
    #[error("Failed to write {path:?}: {source}")]
    WritePage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client construction failed.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// A detection endpoint is not a URL.
    #[error("Invalid detection endpoint '{endpoint}': {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Project root holding the settings file
    pub root: PathBuf,
    /// Page snapshot to localize
    pub page: PathBuf,
    /// Where the localized snapshot goes
    pub out: PathBuf,
    /// Locale switched to after initialization
    pub locale: Option<LocaleId>,
    /// Skip geolocation
    pub offline: bool,
}

impl Args {
    /// Returns `Ok(None)` when help was requested.
    ///
    /// # Errors
    /// Missing or malformed options, or leftover arguments.
    pub fn parse(mut pargs: pico_args::Arguments) -> Result<Option<Self>, CliError> {
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }
        let args = Self {
            offline: pargs.contains("--offline"),
            root: pargs.opt_value_from_str("--root")?.unwrap_or_else(|| PathBuf::from(".")),
            locale: pargs.opt_value_from_str::<_, String>("--locale")?.map(LocaleId::from),
            page: pargs.value_from_str("--page")?,
            out: pargs.value_from_str("--out")?,
        };
        let rest = pargs.finish();
        if !rest.is_empty() {
            return Err(CliError::UnexpectedArgs(
                rest.into_iter().map(|a| a.to_string_lossy().into_owned()).collect(),
            ));
        }
        Ok(Some(args))
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// How initialization ended
    pub init: InitOutcome,
    /// Result of the `--locale` switch, if one was requested.
    pub requested_switch: Option<bool>,
    /// Locale bound when the run finished
    pub final_locale: Option<LocaleId>,
}

/// Loader for the configured bundle source.
fn build_loader(settings: &L10nSettings, args: &Args, http: &reqwest::Client) -> Arc<dyn TranslationLoader> {
    match settings.translations.source(&args.root) {
        TranslationSource::Http(url) => Arc::new(HttpTranslationLoader::new(url, http.clone())),
        TranslationSource::Directory(dir) => Arc::new(FileTranslationLoader::new(dir)),
    }
}

/// Detector over the configured endpoints, or none when offline.
fn build_detector(settings: &L10nSettings, args: &Args, http: &reqwest::Client) -> Result<GeoLocaleDetector, CliError> {
    let endpoints = if args.offline {
        Vec::new()
    } else {
        settings
            .detection
            .endpoints
            .iter()
            .map(|endpoint| {
                Url::parse(endpoint).map_err(|source| CliError::Endpoint { endpoint: endpoint.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?
    };
    let timeout = Duration::from_millis(settings.detection.attempt_timeout_ms);
    let lookup = Arc::new(HttpGeoLookup::new(endpoints, http.clone(), timeout));
    Ok(GeoLocaleDetector::new(lookup, &settings.detection))
}

/// Loads settings from `args.root`, localizes `args.page` and writes `args.out`.
///
/// # Errors
/// Configuration, page I/O and HTTP client construction errors. Translation
/// and detection failures are not errors; they show up in the summary.
pub async fn run(args: &Args) -> Result<RunSummary, CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(&args.root)?;
    let settings = config_manager.get_settings();

    let content = tokio::fs::read_to_string(&args.page)
        .await
        .map_err(|source| CliError::ReadPage { path: args.page.clone(), source })?;
    let page: PageSnapshot = serde_json::from_str(&content)?;
    let dom = Arc::new(MemoryDom::from_snapshot(page));

    let request_timeout = Duration::from_millis(
        settings.translations.timeout_ms.max(settings.detection.attempt_timeout_ms),
    );
    let http = reqwest::Client::builder().timeout(request_timeout).build()?;
    let loader = build_loader(settings, args, &http);
    let detector = build_detector(settings, args, &http)?;
    let store = Arc::new(FileLocaleStore::new(args.root.join(&settings.storage.path), settings.storage.key.clone()));

    let switcher = Arc::new(LanguageSwitcher::new(dom.clone(), loader, store.clone(), settings));
    let _dropdowns = LanguageDropdowns::attach(&switcher);
    let _mobile_menu = MobileMenu::attach(&switcher);
    let slot = SwitcherSlot::new();
    slot.provide(switcher.clone());

    let init = initialize(&slot, store.as_ref(), &detector, dom.as_ref(), &settings.readiness).await;

    let requested_switch = match &args.locale {
        Some(locale) => Some(switcher.switch_to(locale, false).await),
        None => None,
    };

    let output = serde_json::to_string_pretty(&dom.to_snapshot())?;
    tokio::fs::write(&args.out, output)
        .await
        .map_err(|source| CliError::WritePage { path: args.out.clone(), source })?;
    tracing::info!(out = %args.out.display(), "Wrote localized page");

    Ok(RunSummary { init, requested_switch, final_locale: switcher.current_locale() })
}
