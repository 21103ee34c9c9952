use mapml_checker::{Checker, CheckerConfig, Collector, Reader, report};

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::process::exit;

use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
enum Cli {
    /// Check MapML documents and print what is wrong with them
    Check {
        /// The documents are stylesheets; CSS messages get no "CSS: " prefix
        #[structopt(long)]
        css_source: bool,
        /// Exit with failure status when there are only warnings
        #[structopt(long)]
        warnings_as_errors: bool,
        files: Vec<PathBuf>,
    },
}

/// Exit status when a document breaks a rule.
const INVALID: i32 = 1;
/// Exit status when a document could not be read or parsed.
const UNREADABLE: i32 = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::from_args() {
        Cli::Check {
            css_source,
            warnings_as_errors,
            files,
        } => exit(check(
            CheckerConfig {
                source_is_css: css_source,
            },
            warnings_as_errors,
            files,
        )),
    }
}

fn emit(map: &codemap::CodeMap, diagnostics: &[codemap_diagnostic::Diagnostic]) {
    let mut emitter =
        codemap_diagnostic::Emitter::stderr(codemap_diagnostic::ColorConfig::Auto, Some(map));
    emitter.emit(diagnostics);
}

fn check(config: CheckerConfig, warnings_as_errors: bool, files: Vec<PathBuf>) -> i32 {
    let mut status = 0;
    let mut checker = Checker::new(Collector::new(), config);
    for path in files {
        let name = path.to_string_lossy().to_string();
        let mut doc = String::new();
        if let Err(err) = File::open(&path).and_then(|mut f| f.read_to_string(&mut doc)) {
            eprintln!("{name}: {err}");
            status = UNREADABLE;
            continue;
        }
        info!("Checking {name}");
        let mut reader = Reader::new(&doc, checker).with_system_id(name.as_str());
        let result = reader.check_all();
        if let Err(ref err) = result {
            let (map, d) = reader.diagnostic(name.clone(), doc.clone(), err);
            emit(&map, &d);
            status = UNREADABLE;
        }
        checker = reader.into_checker();
        let failed = checker.sink().has_errors()
            || (warnings_as_errors && !checker.sink().diagnostics.is_empty());
        let found = std::mem::take(&mut checker.sink_mut().diagnostics);
        debug!(
            diagnostics = found.len(),
            use_counters = ?checker.sink().use_counters,
            "checked {name}"
        );
        checker.sink_mut().clear();
        if !found.is_empty() {
            let (map, d) = report::diagnostics(name, doc.clone(), &found);
            emit(&map, &d);
        }
        if failed && status == 0 {
            status = INVALID;
        }
    }
    status
}
