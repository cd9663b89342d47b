//! tensorsat - enumerate finite boolean structures with a SAT solver
//!
//! Usage: tensorsat [OPTIONS] <command> [args...]
//!
//! Commands:
//!   grid <rows> <cols>            - Placements of exactly one cell in a grid
//!   relations <size> <property>   - Binary relations with a property
//!   operations <size> <property>  - Ternary operations with a property
//!   decode <size> <table>         - Show the tensor of an operation table
//!   monoid <size> <table>         - Invariant relations and operations of a monoid
//!
//! Set RUST_LOG (e.g. `RUST_LOG=tensorsat=debug`) to trace the solver.

use std::time::Instant;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tensorsat::relations::{
    galois_connection, is_monoid, ClosedSubsets, Invariants, MonoidQuery, OperationProperty,
    RelationProperty,
};
use tensorsat::{
    table, Aggregate, BoolAlgebra, Bindings, Concrete, EnumerateOptions, Formula, ProblemSpec,
    Result, VarisatSolver,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exactly one cell of `grid` is true.
struct ExactlyOne;

impl Formula for ExactlyOne {
    fn compute<A: BoolAlgebra>(&self, alg: &mut A, vars: &Bindings<A::Elem>) -> Result<A::Elem> {
        let grid = vars.get("grid")?;
        alg.fold(Aggregate::One, grid.rank(), grid)?.to_scalar()
    }
}

struct Options {
    limit: Option<usize>,
    quiet: bool,
    command: Vec<String>,
}

fn usage() {
    println!("tensorsat v{} - boolean tensor constraints over SAT", VERSION);
    println!();
    println!("Usage: tensorsat [OPTIONS] <command> [args...]");
    println!();
    println!("Commands:");
    println!("  grid <rows> <cols>            Exactly-one placements in a grid");
    println!("  relations <size> <property>   reflexive, symmetric, transitive,");
    println!("                                equivalence or essential relations");
    println!("  operations <size> <property>  majority or maltsev operations");
    println!("  decode <size> <table>         Show the tensor of a table, e.g. \"0 1 1 0\"");
    println!("  monoid <size> <table>         Count relations and operations invariant");
    println!("                                under the maps of a table, e.g. \"0 1 2 0 0 0\"");
    println!();
    println!("Options:");
    println!("  -n, --limit <count>  Stop after <count> models");
    println!("  -q, --quiet          Print only the number of models");
    println!("  -h, --help           Show this help message");
    println!("  -v, --version        Show version");
}

/// Parse command line arguments.
fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        limit: None,
        quiet: false,
        command: Vec::new(),
    };
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-n" | "--limit" => {
                let Some(count) = args.get(i + 1).and_then(|n| n.parse().ok()) else {
                    eprintln!("Error: {} requires a count argument", arg);
                    std::process::exit(1);
                };
                options.limit = Some(count);
                i += 2;
            }
            "-q" | "--quiet" => {
                options.quiet = true;
                i += 1;
            }
            "-h" | "--help" => {
                usage();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                println!("tensorsat v{}", VERSION);
                std::process::exit(0);
            }
            _ if arg.starts_with('-') => {
                eprintln!("Error: Unknown option '{}'", arg);
                eprintln!("Try 'tensorsat --help' for usage information");
                std::process::exit(1);
            }
            _ => {
                options.command.push(arg.clone());
                i += 1;
            }
        }
    }

    options
}

fn number(arg: Option<&String>, what: &str) -> usize {
    match arg.map(|s| s.parse::<usize>()) {
        Some(Ok(n)) => n,
        Some(Err(_)) | None => {
            eprintln!("Error: expected a number for <{}>", what);
            std::process::exit(1);
        }
    }
}

fn relation_property(name: &str) -> Option<RelationProperty> {
    Some(match name {
        "reflexive" => RelationProperty::Reflexive,
        "symmetric" => RelationProperty::Symmetric,
        "transitive" => RelationProperty::Transitive,
        "equivalence" => RelationProperty::Equivalence,
        "essential" => RelationProperty::Essential,
        _ => return None,
    })
}

fn operation_property(name: &str) -> Option<OperationProperty> {
    Some(match name {
        "majority" => OperationProperty::Majority,
        "maltsev" => OperationProperty::Maltsev,
        _ => return None,
    })
}

/// Enumerate and print the models of `problem`.
fn run<F: Formula>(problem: &ProblemSpec<F>, options: &Options) -> Result<()> {
    let mut solver = VarisatSolver::new();
    let bounds = EnumerateOptions {
        limit: options.limit,
    };

    if options.quiet && bounds.limit.is_none() {
        println!("{}", problem.count(&mut solver)?);
        return Ok(());
    }

    let solutions = problem.enumerate(&mut solver, &bounds)?;
    if !options.quiet {
        for (i, solution) in solutions.iter().enumerate() {
            println!("model {}:", i + 1);
            print!("{}", solution);
            println!();
        }
    }
    println!("{}", solutions.len());
    Ok(())
}

/// Count the invariants of a monoid, then the clones of its Galois connection.
fn statistics(size: usize, text: &str, options: &Options) -> Result<()> {
    let started = Instant::now();
    let monoid = table::decode(size, text)?;
    if !is_monoid(&mut Concrete, &monoid)? {
        warn!(table = text, "maps are repeated or not closed under composition");
    }

    let mut solver = VarisatSolver::new();
    let bounds = EnumerateOptions {
        limit: options.limit,
    };
    let mut relations = None;
    let mut operations = None;

    println!("monoid: {}", text);
    for query in MonoidQuery::ALL {
        let problem = Invariants::new(monoid.clone(), query)?.problem()?;
        let models = problem.collect(&mut solver, &bounds)?;
        let stacked = models.get(query.variable())?.clone();
        let found = stacked.shape().last().copied().unwrap_or(0);
        println!("{:<24}{}", format!("{}:", query.describe()), found);
        match query {
            MonoidQuery::EssentialTernaryRelations => relations = Some(stacked),
            MonoidQuery::BinaryOperations => operations = Some(stacked),
            _ => {}
        }
    }

    if let (Some(relations), Some(operations)) = (relations, operations) {
        let galois = galois_connection(&operations, &relations)?;
        let shape = galois.shape();
        println!("{:<24}{} {}", "galois connection:", shape[0], shape[1]);
        let closed = ClosedSubsets::problem(galois)?.count(&mut solver)?;
        println!("{:<24}{}", "closed sets (clones):", closed);
    }

    info!(seconds = started.elapsed().as_secs_f64(), "statistics finished");
    Ok(())
}

fn dispatch(options: &Options) -> Result<()> {
    let args = &options.command;
    let Some(command) = args.first() else {
        usage();
        std::process::exit(1);
    };

    match command.as_str() {
        "grid" => {
            let rows = number(args.get(1), "rows");
            let cols = number(args.get(2), "cols");
            let problem = ProblemSpec::new([("grid", vec![rows, cols])], ExactlyOne)?;
            run(&problem, options)
        }
        "relations" => {
            let size = number(args.get(1), "size");
            let name = args.get(2).map(String::as_str).unwrap_or("");
            let Some(property) = relation_property(name) else {
                eprintln!("Error: unknown relation property '{}'", name);
                std::process::exit(1);
            };
            info!(size, ?property, "enumerating relations");
            run(&property.problem(size)?, options)
        }
        "operations" => {
            let size = number(args.get(1), "size");
            let name = args.get(2).map(String::as_str).unwrap_or("");
            let Some(property) = operation_property(name) else {
                eprintln!("Error: unknown operation property '{}'", name);
                std::process::exit(1);
            };
            info!(size, ?property, "enumerating operations");
            run(&property.problem(size)?, options)
        }
        "decode" => {
            let size = number(args.get(1), "size");
            let text = args.get(2).map(String::as_str).unwrap_or("");
            let tensor = table::decode(size, text)?;
            println!("{:?}", tensor.shape());
            print!("{}", tensor);
            Ok(())
        }
        "monoid" => {
            let size = number(args.get(1), "size");
            let text = args.get(2).map(String::as_str).unwrap_or("");
            statistics(size, text, options)
        }
        other => {
            eprintln!("Error: Unknown command '{}'", other);
            eprintln!("Try 'tensorsat --help' for usage information");
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tensorsat=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args);

    if let Err(err) = dispatch(&options) {
        eprintln!("Error: {}", err);
        std::process::exit(if err.is_malformed_input() { 1 } else { 2 });
    }
}
