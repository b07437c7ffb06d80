use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use schemaboard::editor::{Editor, EditorConfig};
use schemaboard::filter::Direction;
use schemaboard::ident::TableKey;
use schemaboard::svg::SvgRenderer;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Rendered diagram
    Svg,
    /// Re-export in the `;`-delimited import format
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "schemaboard")]
#[command(version, about = "Lay out and render a `;`-delimited schema description")]
struct Cli {
    /// Input file (header line plus one row per column)
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// Show only these tables, as schema.table (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    show: Option<Vec<String>>,

    /// Reveal neighbours of a table: schema.table:to or schema.table:from
    #[arg(short, long)]
    expand: Vec<String>,

    /// Seed for the initial placement of tables without coordinates
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn parse_key(s: &str) -> Result<TableKey> {
    TableKey::parse(s).with_context(|| format!("Invalid table key '{s}', expected schema.table"))
}

fn parse_expand(s: &str) -> Result<(TableKey, Direction)> {
    let Some((key, dir)) = s.rsplit_once(':') else {
        bail!("Invalid expand '{s}', expected schema.table:to or schema.table:from");
    };
    let direction = Direction::from_str(dir)
        .with_context(|| format!("Invalid direction '{dir}', expected to or from"))?;
    Ok((parse_key(key)?, direction))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let mut editor = Editor::new(EditorConfig {
        seed: cli.seed,
        ..EditorConfig::default()
    });
    editor.load(&input);

    if let Some(show) = &cli.show {
        let keys = show.iter().map(|s| parse_key(s)).collect::<Result<Vec<_>>>()?;
        editor.set_filter(keys);
    }
    for arg in &cli.expand {
        let (key, direction) = parse_expand(arg)?;
        editor.expand_filter(&key, direction);
    }

    let output = match cli.format {
        Format::Svg => SvgRenderer::default().render(&editor.render_plan()),
        Format::Csv => editor.export_text(),
    };

    match &cli.output {
        Some(path) => fs::write(path, &output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{output}"),
    }

    eprintln!("{}", editor.status());
    Ok(())
}
