//! DASM CLI entry point.

use std::io::Read;
use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use dasm_ir::{CompileContext, CompileOptions, HostCapabilities, InstructionRegistry, OperandType};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dasm")]
#[command(about = "SMD/DASM compiler front end")]
struct Cli {
    /// Report that the host runtime supports wasm SIMD
    #[arg(long, global = true)]
    simd: bool,

    /// Report that the host runtime supports relaxed wasm SIMD
    #[arg(long, global = true)]
    relaxed_simd: bool,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile SMD source to an AST (JSON)
    Compile {
        /// Input SMD file (or - for stdin)
        file: String,

        /// Output file
        #[arg(short, long)]
        out: Option<String>,

        /// Write to stdout instead of file
        #[arg(long)]
        stdout: bool,
    },

    /// Read the data section of a DASM file (JSON)
    Data {
        /// Input DASM file (or - for stdin)
        file: String,

        /// Output file
        #[arg(short, long)]
        out: Option<String>,

        /// Write to stdout instead of file
        #[arg(long)]
        stdout: bool,

        /// Log every declared value, as `# dd` does
        #[arg(long)]
        dump_data: bool,
    },

    /// Resolve the result type of an instruction
    Resolve {
        /// Instruction name
        name: String,

        /// Operand types, e.g. `num vec2[]`
        types: Vec<String>,

        /// Registry schema file (TOML) to use instead of the built-in table
        #[arg(long)]
        schema: Option<String>,
    },

    /// Print the instruction registry
    Instructions {
        /// Registry schema file (TOML) to use instead of the built-in table
        #[arg(long)]
        schema: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Toml)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // Logs go to stderr so `--stdout` output stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(format!("dasm={level}").parse()?))
        .with_writer(std::io::stderr)
        .init();

    let capabilities = (cli.simd || cli.relaxed_simd).then_some(HostCapabilities {
        simd: cli.simd,
        relaxed_simd: cli.relaxed_simd,
    });

    match cli.command {
        Commands::Compile { file, out, stdout } => {
            let source = read_input(&file)?;
            let mut ctx = CompileContext::with_options(CompileOptions {
                capabilities,
                ..Default::default()
            });
            let program = dasm_syntax_smd::compile_with(&mut ctx, &source)?;
            let json = serde_json::to_string_pretty(&program)?;
            write_output(&file, out, stdout, &json)?;
        }

        Commands::Data {
            file,
            out,
            stdout,
            dump_data,
        } => {
            let source = read_input(&file)?;
            let mut ctx = CompileContext::with_options(CompileOptions {
                dump_data,
                capabilities,
            });
            let module = dasm_ir::compile_with(&mut ctx, &source)?;
            info!(
                functions = module.functions.len(),
                program = module.program.len(),
                "retained section lines"
            );
            let json = serde_json::to_string_pretty(&module.data)?;
            write_output(&file, out, stdout, &json)?;
        }

        Commands::Resolve {
            name,
            types,
            schema,
        } => {
            let registry = load_registry(schema.as_deref())?;
            let operands = types
                .iter()
                .map(|word| {
                    OperandType::parse(word).ok_or_else(|| format!("unknown operand type '{}'", word))
                })
                .collect::<Result<Vec<_>, _>>()?;
            match registry.resolve_operands(&name, &operands)? {
                Some(result) => println!("{}", result),
                None => println!("none"),
            }
        }

        Commands::Instructions { schema, format } => {
            let registry = load_registry(schema.as_deref())?;
            let text = match format {
                Format::Toml => registry.to_toml_string()?,
                Format::Json => serde_json::to_string_pretty(&registry.to_schema())?,
            };
            println!("{}", text);
        }
    }

    Ok(())
}

fn read_input(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

/// Write to `out`, or next to the input as `<stem>.json`.
fn write_output(
    file: &str,
    out: Option<String>,
    stdout: bool,
    json: &str,
) -> std::io::Result<()> {
    if stdout {
        println!("{}", json);
        return Ok(());
    }
    let out_path = match out {
        Some(path) => path,
        None if file == "-" => "output.json".to_string(),
        None => Path::new(file).with_extension("json").to_string_lossy().into_owned(),
    };
    std::fs::write(&out_path, json)?;
    println!("Wrote: {}", out_path);
    Ok(())
}

fn load_registry(
    schema: Option<&str>,
) -> Result<InstructionRegistry, dasm_ir::SchemaError> {
    match schema {
        Some(path) => InstructionRegistry::from_file(path),
        None => Ok(InstructionRegistry::builtin().clone()),
    }
}
