use anyhow::Context;
use clap::{Parser, Subcommand};
use featurex::{Descriptor, Feature};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Fit descriptors and convert JSON records into numeric rows
#[derive(Parser, Debug)]
#[command(name = "featurex")]
#[command(about = "Convert records into fixed-layout numeric vectors", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Learn vocabularies and categories from a dataset and pin the layout
    Fit {
        /// Descriptor definition (JSON)
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Training records, one JSON object per line
        #[arg(long)]
        data: PathBuf,

        /// Where to write the fitted descriptor
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Convert records into CSV rows
    Convert {
        /// Descriptor (JSON); fitted on the data first if not laid out yet
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Records, one JSON object per line
        #[arg(long)]
        data: PathBuf,

        /// Append the label column
        #[arg(long)]
        labels: bool,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the columns of a descriptor
    Columns {
        #[arg(short, long)]
        descriptor: PathBuf,
    },
}

fn read_records(path: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut records = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid JSON record", path.display(), n + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn csv_field(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_csv(out: &mut dyn Write, header: &[String], rows: &[Vec<f64>]) -> io::Result<()> {
    let header: Vec<String> = header.iter().map(|h| csv_field(h)).collect();
    writeln!(out, "{}", header.join(","))?;
    for row in rows {
        let cells: Vec<String> = row.iter().map(|x| x.to_string()).collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()
}

fn fit(descriptor: &Path, data: &Path, out: &Path) -> anyhow::Result<()> {
    let mut descriptor = Descriptor::load(descriptor)?;
    let records = read_records(data)?;
    info!("Fitting on {} records", records.len());

    descriptor.fit(&records)?;
    descriptor.save(out)?;

    info!("Vector length: {}", descriptor.vector_length());
    info!("Fitted descriptor written to {:?}", out);
    Ok(())
}

fn convert(descriptor: &Path, data: &Path, labels: bool, out: Option<&Path>) -> anyhow::Result<()> {
    let mut descriptor = Descriptor::load(descriptor)?;
    let records = read_records(data)?;

    let rows = if descriptor.is_laid_out() {
        descriptor.transform(&records, labels)?
    } else {
        info!("Descriptor is not fitted; learning from the input data");
        descriptor.convert_dataset(&records, labels)?
    };

    let mut header = descriptor.columns();
    if labels {
        if let Some(label) = descriptor.label() {
            header.push(label.name().to_string());
        }
    }

    match out {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            write_csv(&mut file, &header, &rows)?;
            info!("Wrote {} rows to {:?}", rows.len(), path);
        }
        None => {
            let stdout = io::stdout();
            write_csv(&mut stdout.lock(), &header, &rows)?;
        }
    }
    Ok(())
}

fn columns(descriptor: &Path) -> anyhow::Result<()> {
    let descriptor = Descriptor::load(descriptor)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, name) in descriptor.columns().iter().enumerate() {
        let owner = descriptor.feature_at(index)?;
        writeln!(out, "{}\t{}\t{}", index, name, owner.name())?;
    }
    if let Some(label) = descriptor.label() {
        writeln!(out, "label\t{}\t{}", label.columns().join(","), label.name())?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Fit { descriptor, data, out } => fit(&descriptor, &data, &out),
        Command::Convert {
            descriptor,
            data,
            labels,
            out,
        } => convert(&descriptor, &data, labels, out.as_deref()),
        Command::Columns { descriptor } => columns(&descriptor),
    }
}
