use quokka::{Charge, ForceOptions, FrameBudget, Node, Simulation};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(quokka::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<quokka::Error> for CliError {
    fn from(value: quokka::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Frames,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    verbose: bool,
    friction: Option<f64>,
    charge: Option<f64>,
    theta: Option<f64>,
    ticks_per_frame: usize,
}

#[derive(Debug, Deserialize)]
struct GraphIn {
    nodes: Vec<NodeIn>,
    #[serde(default)]
    options: OptionsIn,
}

#[derive(Debug, Deserialize)]
struct NodeIn {
    x: f64,
    y: f64,
    #[serde(default)]
    fixed: bool,
    #[serde(default)]
    charge: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OptionsIn {
    friction: Option<f64>,
    charge: Option<f64>,
    gravity: Option<f64>,
    theta: Option<f64>,
}

#[derive(Serialize)]
struct PointOut {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct LayoutOut {
    ticks: usize,
    nodes: Vec<PointOut>,
}

#[derive(Serialize)]
struct FrameOut {
    frame: usize,
    ticks: usize,
    alpha: f64,
    nodes: Vec<PointOut>,
}

fn usage() -> &'static str {
    "quokka-cli\n\
\n\
USAGE:\n\
  quokka-cli [layout] [--pretty] [--friction <f>] [--charge <c>] [--theta <t>] [--verbose] [<path>|-]\n\
  quokka-cli frames [--ticks-per-frame <n>] [--friction <f>] [--charge <c>] [--theta <t>] [--verbose] [<path>|-]\n\
\n\
INPUT:\n\
  {\"nodes\": [{\"x\": 0, \"y\": 0, \"fixed\": false, \"charge\": -30}], \"options\": {\"theta\": 0.8}}\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - layout prints the settled positions and the number of ticks.\n\
  - frames prints one JSON line per frame until the layout settles.\n\
  - Per-node `charge` overrides the uniform charge for that node.\n\
  - Set QUOKKA_LOG (e.g. `debug`) or pass --verbose for diagnostics on stderr.\n\
"
}

fn parse_f64(value: Option<&String>) -> Result<f64, CliError> {
    let Some(value) = value else {
        return Err(CliError::Usage(usage()));
    };
    value.parse::<f64>().map_err(|_| CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        ticks_per_frame: 1,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "frames" => args.command = Command::Frames,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--friction" => args.friction = Some(parse_f64(it.next())?),
            "--charge" => args.charge = Some(parse_f64(it.next())?),
            "--theta" => args.theta = Some(parse_f64(it.next())?),
            "--ticks-per-frame" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.ticks_per_frame = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "-" if args.input.is_none() => args.input = Some(a.clone()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("QUOKKA_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn points(nodes: &[Node]) -> Vec<PointOut> {
    nodes.iter().map(|n| PointOut { x: n.x, y: n.y }).collect()
}

/// Merges file options with command-line overrides.
fn resolve_options(file: &OptionsIn, args: &Args) -> ForceOptions {
    let defaults = ForceOptions::default();
    ForceOptions {
        friction: args.friction.or(file.friction).unwrap_or(defaults.friction),
        charge: args.charge.or(file.charge).unwrap_or(defaults.charge),
        gravity: file.gravity.unwrap_or(defaults.gravity),
        theta: args.theta.or(file.theta).unwrap_or(defaults.theta),
    }
}

/// Uniform charge unless any node carries its own.
fn resolve_charge(graph: &GraphIn, uniform: f64) -> Charge {
    if graph.nodes.iter().all(|n| n.charge.is_none()) {
        return Charge::constant(uniform);
    }
    let per_node: Vec<f64> = graph
        .nodes
        .iter()
        .map(|n| n.charge.unwrap_or(uniform))
        .collect();
    Charge::from_fn(move |_, i| per_node.get(i).copied().unwrap_or(uniform))
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let graph: GraphIn = serde_json::from_str(&text)?;
    let opts = resolve_options(&graph.options, &args);
    let charge = resolve_charge(&graph, opts.charge);
    let nodes: Vec<Node> = graph
        .nodes
        .iter()
        .map(|n| if n.fixed { Node::pinned(n.x, n.y) } else { Node::new(n.x, n.y) })
        .collect();
    tracing::debug!(nodes = nodes.len(), ?opts, "input loaded");

    match args.command {
        Command::Layout => {
            let result = quokka::layout_with_charge(&nodes, &opts, charge)?;
            let out = LayoutOut {
                ticks: result.ticks,
                nodes: result
                    .positions
                    .iter()
                    .map(|p| PointOut { x: p.x, y: p.y })
                    .collect(),
            };
            write_json(&out, args.pretty)
        }
        Command::Frames => {
            opts.validate()?;
            quokka::check_nodes(&nodes)?;

            let mut sim = Simulation::new(opts).with_nodes(nodes);
            sim.set_charge(charge);
            sim.start();
            quokka::check_charges(sim.charges())?;
            let mut driver = FrameBudget::new(args.ticks_per_frame);
            let mut frame = 0usize;
            loop {
                let done = sim.drive(&mut driver);
                frame += 1;
                write_json(
                    &FrameOut {
                        frame,
                        ticks: sim.ticks(),
                        alpha: sim.alpha(),
                        nodes: points(sim.nodes()),
                    },
                    false,
                )?;
                if done {
                    break;
                }
            }
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_logging(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
