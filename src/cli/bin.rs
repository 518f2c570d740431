extern crate veil;
#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate simplelog;
extern crate walkdir;

use clap::{App, Arg, SubCommand};
use walkdir::WalkDir;

use veil::common::compilation::CompilableTo;
use veil::common::retrieve::{load_document, load_settings};
use veil::common::validation::Validatable;
use veil::input::memory::MemoryDocument;
use veil::output::annotation::suppressed_count;
use veil::output::render::render_html;
use veil::output::report::{FrameContext, LogMessenger};
use veil::scan::scanner::ScanController;
use veil::settings::options::ScanOptions;
use veil::settings::settings::{SettingsFile, SettingsSource};

fn main() {
    let matches = App::new("Veil Command Line Interface")
        .version(crate_version!())
        .about("Hide the parts of a document that mention blacklisted phrases.")
        .author(crate_authors!())
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("log every scanning decision"),
        )
        .subcommand(
            SubCommand::with_name("validate")
                .about("validate a settings file")
                .arg(
                    Arg::with_name("settings")
                        .help("the path of the settings file to validate")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("scan")
                .about("scan document fixtures and report what would be hidden")
                .arg(
                    Arg::with_name("settings")
                        .help("the path of the settings file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("documents")
                        .help("document fixtures, or directories of them")
                        .required(true)
                        .multiple(true)
                        .index(2),
                )
                .arg(
                    Arg::with_name("host")
                        .long("host")
                        .takes_value(true)
                        .help("the host the documents are served from; defaults to each fixture's url"),
                )
                .arg(
                    Arg::with_name("html")
                        .long("html")
                        .help("print each annotated document as HTML"),
                ),
        )
        .get_matches();

    let level = if matches.is_present("verbose") {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::CombinedLogger::init(vec![
        simplelog::TermLogger::new(level, simplelog::Config::default()).unwrap(),
    ])
    .unwrap();

    run(matches);
}

fn run(matches: clap::ArgMatches) {
    match matches.subcommand() {
        ("validate", Some(m)) => run_validate(m),
        ("scan", Some(m)) => run_scan(m),
        _ => error!("no command specified; try running with `--help`."),
    }
}

fn run_validate(matches: &clap::ArgMatches) {
    let path = matches.value_of("settings").unwrap(); // safe to unwrap, CLAP makes sure of it

    info!("loading settings file `{}`", path);

    if !path.ends_with(".ron") {
        warn!("path does not end with `.ron`")
    }

    let settings = match load_settings(path) {
        Ok(value) => value,
        Err(issue) => {
            error!("unable to load settings: {}", issue);
            return;
        }
    };
    info!("loaded {} phrase(s)", settings.blacklist.len());
    match settings.validate() {
        Some(issues) => {
            error!("settings validation encountered issues:");
            for issue in issues {
                error!("    - {}", issue);
            }
        }
        None => info!("validation encountered no issues"),
    }
    match settings.phrases().compile() {
        Ok(_) => info!("phrase set compiled successfully"),
        Err(issue) => error!("unable to compile phrase set: {}", issue),
    }
}

fn run_scan(matches: &clap::ArgMatches) {
    let source = SettingsFile {
        path: String::from(matches.value_of("settings").unwrap()),
    };
    // Fail early on a broken file rather than once per document.
    if let Err(issue) = source.fetch() {
        error!("unable to load settings: {}", issue);
        return;
    }
    let host = matches.value_of("host");
    let print_html = matches.is_present("html");

    let mut paths: Vec<String> = Vec::new();
    for root in matches.values_of("documents").unwrap() {
        for entry in WalkDir::new(root).into_iter() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file()
                        && entry.path().extension().map_or(false, |ext| ext == "ron")
                    {
                        paths.push(entry.path().to_string_lossy().into_owned());
                    }
                }
                Err(error) => warn!("unable to walk `{}`: {}", root, error),
            }
        }
    }
    info!("found {} document(s)", paths.len());

    let mut total = 0;
    for (index, path) in paths.iter().enumerate() {
        let spec = match load_document(path) {
            Ok(value) => value,
            Err(issue) => {
                error!("{}", issue);
                continue;
            }
        };
        let document_host = match (host, &spec.url) {
            (Some(host), _) => String::from(host),
            (None, Some(url)) => url.clone(),
            (None, None) => {
                warn!("`{}` has no url and no --host was given; per-host settings are ignored", path);
                String::new()
            }
        };

        let mut controller = ScanController::new(
            MemoryDocument::from_spec(&spec.root),
            &document_host,
            FrameContext::top_level(index as u64),
            Box::new(LogMessenger),
            ScanOptions::default(),
        );
        controller.refresh(&source);

        let hidden = suppressed_count(controller.document());
        total += hidden;
        info!("`{}`: {} element(s) hidden", path, hidden);
        if print_html {
            println!("{}", render_html(controller.document()));
        }
    }
    info!("{} element(s) hidden across {} document(s)", total, paths.len());
}
