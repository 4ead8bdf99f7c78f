#[macro_use]
extern crate log;

use std::process;

use tract_classify::format::{format_classes, format_probabilities};
use tract_classify::predict;

use crate::params::Parameters;

mod params;

type CliResult<T> = anyhow::Result<T>;

fn positive_integer(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn app() -> clap::Command<'static> {
    use clap::*;
    Command::new("predict")
        .version(crate_version!())
        .about("Print the top-K classes a model predicts for an image")
        .arg(Arg::new("image_path").required(true).help("Path to the image file"))
        .arg(
            Arg::new("saved_model")
                .required(true)
                .help("Model to use (.onnx, .pb, .tflite, or an NNEF directory or tarball)"),
        )
        .arg(
            Arg::new("top_k")
                .long("top_k")
                .visible_alias("top-k")
                .takes_value(true)
                .value_name("N")
                .validator(positive_integer)
                .help("Number of top classes shown [default: 5]"),
        )
        .arg(
            Arg::new("category_names")
                .long("category_names")
                .visible_alias("category-names")
                .takes_value(true)
                .value_name("FILE")
                .help("JSON file with class<->label mapping"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .takes_value(true)
                .validator(|s| s.parse::<tract_classify::ModelFormat>())
                .help("Hint the model format (onnx, tf, nnef or tflite) instead of guessing from the path"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .multiple_occurrences(true)
                .help("Sets the level of verbosity."),
        )
}

/// Entrypoint for the command-line interface.
fn main() {
    let matches = app().get_matches();

    let level = match matches.occurrences_of("verbosity") {
        0 => "predict=warn,tract_classify=warn",
        1 => "predict=info,tract_classify=info",
        2 => "predict=debug,tract_classify=debug",
        _ => "predict=trace,tract_classify=trace",
    };
    let env = env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level);
    env_logger::Builder::from_env(env).format_timestamp_nanos().init();

    if let Err(e) = handle(&matches) {
        error!("{:?}", e);
        process::exit(1)
    }
}

/// Handles the command-line input.
fn handle(matches: &clap::ArgMatches) -> CliResult<()> {
    let params = Parameters::from_clap(matches)?;
    debug!("{:?}", params);
    for line in report(&params)? {
        println!("{}", line);
    }
    Ok(())
}

/// The probabilities and classes lines for one run.
fn report(params: &Parameters) -> CliResult<[String; 2]> {
    let labels = params.label_map()?;
    let model = params.classifier()?;
    let prediction = predict(&params.image_path, &model, params.top_k)?;
    Ok([
        format_probabilities(&prediction.probabilities),
        format_classes(&prediction.classes, labels.as_ref())?,
    ])
}
