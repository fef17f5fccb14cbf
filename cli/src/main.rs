use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use clap::{ArgAction, Parser};
use formpath::{
    serialize, validate, Dispatcher, FieldValue, FormField, SerializeOptions, Serialized,
    TemplateMarkers,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "formpath",
    version,
    about = "Build nested JSON from path-named form fields"
)]
struct Args {
    /// Input file with a JSON array of fields. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Print a validation report instead of the document.
    #[arg(long)]
    validate: bool,

    /// Serialize on a worker thread, bounded by --timeout.
    #[arg(long)]
    bounded: bool,

    /// Worker timeout in milliseconds (default: 10000).
    #[arg(long, value_name = "ms")]
    timeout: Option<u64>,

    /// Keep fields marked disabled.
    #[arg(long)]
    include_disabled: bool,

    /// Drop text fields whose value is empty.
    #[arg(long = "no-include-empty", action = ArgAction::SetFalse, default_value_t = true)]
    include_empty: bool,

    /// Fail on the first malformed field instead of skipping it.
    #[arg(long)]
    strict: bool,

    /// Template placeholder token; repeat for several (default: TEMPLATE).
    #[arg(long = "template-marker", value_name = "token")]
    template_markers: Vec<String>,

    /// Indentation size (default: 2).
    #[arg(long, value_name = "number", default_value_t = 2)]
    indent: usize,

    /// Log pipeline decisions to stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// One input item: a `[name, value]` pair or a full field object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputField {
    Pair(String, FieldValue),
    Field(FormField),
}

impl From<InputField> for FormField {
    fn from(item: InputField) -> Self {
        match item {
            InputField::Pair(name, value) => FormField::new(name, value),
            InputField::Field(field) => field,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let input = read_input(args.input.as_deref())?;
    let items: Vec<InputField> = serde_json::from_str(&input)?;
    let fields: Vec<FormField> = items.into_iter().map(FormField::from).collect();
    let options = build_options(&args);
    debug!(fields = fields.len(), ?options, "parsed input");

    let output_target = OutputTarget::from_arg(args.output.as_deref());

    if args.validate {
        let report = validate(&fields, &options);
        with_output_writer(output_target.path(), |writer| {
            write_json(writer, &report, args.indent)
        })?;
        if !report.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    let out = if args.bounded {
        run_bounded(&fields, &options)?
    } else {
        serialize(&fields, &options)?
    };

    for problem in &out.problems {
        eprintln!("WARN {}: {}", problem.key, problem.error);
    }
    with_output_writer(output_target.path(), |writer| {
        write_json(writer, &out.tree, args.indent)
    })
}

fn run_bounded(fields: &[FormField], options: &SerializeOptions) -> Result<Serialized, Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let out = runtime.block_on(Dispatcher::new().serialize(fields, options))?;
    Ok(out)
}

fn build_options(args: &Args) -> SerializeOptions {
    let mut options = SerializeOptions::new()
        .with_include_disabled(args.include_disabled)
        .with_include_empty(args.include_empty)
        .with_strict(args.strict);

    if let Some(timeout) = args.timeout {
        options = options.with_timeout_ms(timeout);
    }
    if !args.template_markers.is_empty() {
        options = options.with_template_markers(TemplateMarkers::new(&args.template_markers));
    }
    options
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("formpath=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(fs::read_to_string(path)?),
    }
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_json<T: Serialize>(
    writer: &mut dyn Write,
    value: &T,
    indent: usize,
) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(&mut *writer, value)?;
    } else {
        let indent_bytes = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
        let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
        value.serialize(&mut serializer)?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}
