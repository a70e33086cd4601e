use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use camp_olympics::camp::{Child, DisciplineRow, Gender, Group, ResultType};
use camp_olympics::output::{self, DisplayOptions};
use camp_olympics::ranking::{self, AggregationMethod, RecordMeasurement};
use camp_olympics::store::{
    CampState, ChildFilter, ChildUpdate, DisciplineUpdate, NewChild, NewDiscipline,
};
use camp_olympics::CampError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_NOT_FOUND: i32 = 1;
const EXIT_INVALID: i32 = 2;
const EXIT_STORE: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config file (interactive unless --defaults)
    Init {
        /// Skip the prompts and write default values
        #[arg(long)]
        defaults: bool,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Manage children
    #[command(subcommand)]
    Child(ChildCommand),
    /// Manage groups and memberships
    #[command(subcommand)]
    Group(GroupCommand),
    /// Manage disciplines and enrolments
    #[command(subcommand)]
    Discipline(DisciplineCommand),
    /// Record one measurement for a child in a discipline
    Record {
        child_id: u64,
        discipline_id: u64,
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Attempt number, 1-based (default: 1)
        #[arg(short, long)]
        attempt: Option<u32>,
    },
    /// Show the ranking of a discipline
    Ranking {
        discipline_id: u64,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
enum ChildCommand {
    /// Register a child
    Add {
        name: String,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        born: NaiveDate,
        #[arg(long, value_enum)]
        gender: Gender,
    },
    /// List children, optionally filtered
    List {
        /// Case-insensitive part of the name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        born: Option<NaiveDate>,
        #[arg(long, value_enum)]
        gender: Option<Gender>,
        #[arg(long)]
        json: bool,
    },
    /// Show a child with groups and disciplines
    Show {
        id: u64,
        #[arg(long)]
        json: bool,
    },
    /// Change a child's details
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        born: Option<NaiveDate>,
        #[arg(long, value_enum)]
        gender: Option<Gender>,
    },
    /// Delete a child with memberships, enrolments and measurements
    Remove { id: u64 },
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    /// Create a group
    Add { name: String },
    /// List groups
    List,
    /// Show a group with its children
    Show {
        id: u64,
        #[arg(long)]
        json: bool,
    },
    /// Rename a group
    Rename { id: u64, name: String },
    /// Delete a group and its memberships
    Remove { id: u64 },
    /// Put a child into a group
    Assign { child_id: u64, group_id: u64 },
    /// Take a child out of a group
    Unassign { child_id: u64, group_id: u64 },
}

#[derive(Subcommand, Debug)]
enum DisciplineCommand {
    /// Create a discipline
    Add {
        name: String,
        /// one_time, multiple_times, number or multiple_numbers
        #[arg(long = "type")]
        result_type: ResultType,
        /// best_result, sum or mean
        #[arg(long)]
        method: AggregationMethod,
    },
    /// List disciplines
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show a discipline with its enrolled children
    Show {
        id: u64,
        #[arg(long)]
        json: bool,
    },
    /// Change a discipline
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        result_type: Option<ResultType>,
        #[arg(long)]
        method: Option<AggregationMethod>,
    },
    /// Delete a discipline with its enrolments and measurements
    Remove { id: u64 },
    /// Enrol a child in a discipline
    Enroll { child_id: u64, discipline_id: u64 },
    /// Withdraw a child from a discipline
    Withdraw { child_id: u64, discipline_id: u64 },
}

#[derive(Parser, Debug)]
#[command(name = "camp-olympics")]
#[command(about = "Summer camp Olympics: children, groups, disciplines and rankings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/camp-olympics/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the store file (overrides store_path from config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Serialize)]
struct ChildDetail<'a> {
    #[serde(flatten)]
    child: &'a Child,
    groups: &'a [Group],
    disciplines: &'a [DisciplineRow],
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CampError>() {
        Some(CampError::NotFound { .. }) => EXIT_NOT_FOUND,
        // Store I/O is handled around `run`; anything else is bad input or output
        _ => EXIT_INVALID,
    }
}

/// Run a child subcommand. Returns whether the store changed.
fn run_child(cmd: ChildCommand, state: &mut CampState, use_colors: bool) -> Result<bool> {
    match cmd {
        ChildCommand::Add { name, born, gender } => {
            let child = state.create_child(NewChild {
                name,
                birth_date: born,
                gender,
            })?;
            println!("Added child {} (id {})", child.name, child.id);
            Ok(true)
        }
        ChildCommand::List {
            name,
            born,
            gender,
            json,
        } => {
            let filter = ChildFilter {
                name,
                birth_date: born,
                gender,
            };
            let children = state.get_children(Some(&filter));
            if json {
                print_json(&children)?;
            } else {
                println!("{}", output::format_children(&children, use_colors));
            }
            Ok(false)
        }
        ChildCommand::Show { id, json } => {
            let with_groups = state
                .get_child_with_groups(id)
                .ok_or(CampError::not_found("Child", id))?;
            let with_disciplines = state
                .get_child_with_disciplines(id)
                .ok_or(CampError::not_found("Child", id))?;
            if json {
                print_json(&ChildDetail {
                    child: &with_groups.child,
                    groups: &with_groups.groups,
                    disciplines: &with_disciplines.disciplines,
                })?;
            } else {
                println!(
                    "{}",
                    output::format_child_detail(&with_groups, &with_disciplines, use_colors)
                );
            }
            Ok(false)
        }
        ChildCommand::Update {
            id,
            name,
            born,
            gender,
        } => {
            let child = state.update_child(
                id,
                ChildUpdate {
                    name,
                    birth_date: born,
                    gender,
                },
            )?;
            println!("Updated child {} (id {})", child.name, child.id);
            Ok(true)
        }
        ChildCommand::Remove { id } => {
            if !state.delete_child(id) {
                return Err(CampError::not_found("Child", id).into());
            }
            println!("Removed child {}", id);
            Ok(true)
        }
    }
}

fn run_group(cmd: GroupCommand, state: &mut CampState) -> Result<bool> {
    match cmd {
        GroupCommand::Add { name } => {
            let group = state.create_group(&name)?;
            println!("Added group {} (id {})", group.name, group.id);
            Ok(true)
        }
        GroupCommand::List => {
            println!("{}", output::format_groups(state.get_groups()));
            Ok(false)
        }
        GroupCommand::Show { id, json } => {
            let group = state
                .get_group_with_children(id)
                .ok_or(CampError::not_found("Group", id))?;
            if json {
                print_json(&group)?;
            } else {
                println!("{}", output::format_group_detail(&group));
            }
            Ok(false)
        }
        GroupCommand::Rename { id, name } => {
            let group = state.update_group(id, &name)?;
            println!("Renamed group {} to {}", group.id, group.name);
            Ok(true)
        }
        GroupCommand::Remove { id } => {
            if !state.delete_group(id) {
                return Err(CampError::not_found("Group", id).into());
            }
            println!("Removed group {}", id);
            Ok(true)
        }
        GroupCommand::Assign { child_id, group_id } => {
            state.assign_child_to_group(child_id, group_id)?;
            println!("Assigned child {} to group {}", child_id, group_id);
            Ok(true)
        }
        GroupCommand::Unassign { child_id, group_id } => {
            if !state.remove_child_from_group(child_id, group_id) {
                return Err(CampError::not_found("Membership of child", child_id).into());
            }
            println!("Removed child {} from group {}", child_id, group_id);
            Ok(true)
        }
    }
}

fn run_discipline(cmd: DisciplineCommand, state: &mut CampState, use_colors: bool) -> Result<bool> {
    match cmd {
        DisciplineCommand::Add {
            name,
            result_type,
            method,
        } => {
            let row = state.create_discipline(NewDiscipline {
                name,
                result_type,
                aggregation_method: method,
            })?;
            println!("Added discipline {} (id {})", row.name, row.id);
            Ok(true)
        }
        DisciplineCommand::List { json } => {
            if json {
                print_json(state.get_disciplines())?;
            } else {
                println!(
                    "{}",
                    output::format_disciplines(state.get_disciplines(), use_colors)
                );
            }
            Ok(false)
        }
        DisciplineCommand::Show { id, json } => {
            let discipline = state.get_discipline_with_children(id)?;
            if json {
                print_json(&discipline)?;
            } else {
                println!(
                    "{}",
                    output::format_disciplines(std::slice::from_ref(&discipline.discipline), use_colors)
                );
                println!("  Enrolled: {}", discipline.children.len());
                for child in &discipline.children {
                    println!("  - {} (id {})", child.name, child.id);
                }
            }
            Ok(false)
        }
        DisciplineCommand::Update {
            id,
            name,
            result_type,
            method,
        } => {
            let row = state.update_discipline(
                id,
                DisciplineUpdate {
                    name,
                    result_type,
                    aggregation_method: method,
                },
            )?;
            println!("Updated discipline {} (id {})", row.name, row.id);
            Ok(true)
        }
        DisciplineCommand::Remove { id } => {
            let row = state.delete_discipline(id)?;
            println!("Removed discipline {} (id {})", row.name, row.id);
            Ok(true)
        }
        DisciplineCommand::Enroll {
            child_id,
            discipline_id,
        } => {
            state.assign_child_to_discipline(child_id, discipline_id)?;
            println!("Enrolled child {} in discipline {}", child_id, discipline_id);
            Ok(true)
        }
        DisciplineCommand::Withdraw {
            child_id,
            discipline_id,
        } => {
            state.remove_child_from_discipline(child_id, discipline_id)?;
            println!("Withdrew child {} from discipline {}", child_id, discipline_id);
            Ok(true)
        }
    }
}

/// True when an attempt number is given for a discipline that takes a single
/// result. A result type that does not parse never counts as unexpected.
fn unexpected_attempt(row: &DisciplineRow, attempt: Option<u32>) -> bool {
    attempt.is_some()
        && ResultType::parse(&row.result_type).is_ok_and(|rt| !rt.expects_attempts())
}

fn run_record(
    state: &mut CampState,
    child_id: u64,
    discipline_id: u64,
    value: f64,
    attempt: Option<u32>,
) -> Result<bool> {
    // Raw row only: recording must not depend on the aggregation method
    let discipline_name = match state.get_discipline_row(discipline_id) {
        Some(row) => {
            if unexpected_attempt(row, attempt) {
                tracing::warn!(
                    discipline_id,
                    attempt = attempt.unwrap_or_default(),
                    result_type = row.result_type.as_str(),
                    "Attempt number given for a discipline that takes a single result"
                );
            }
            row.name.clone()
        }
        None => String::new(),
    };

    let measurement = ranking::record_measurement(
        state,
        RecordMeasurement {
            child_id,
            discipline_id,
            value,
            attempt_number: attempt,
        },
    )?;
    let child_name = state
        .get_child(child_id)
        .map(|c| c.name.as_str())
        .unwrap_or("?");
    println!(
        "{}",
        output::format_measurement(&measurement, child_name, &discipline_name)
    );
    Ok(true)
}

fn run_ranking(
    state: &CampState,
    discipline_id: u64,
    format: OutputFormat,
    opts: &DisplayOptions,
) -> Result<bool> {
    let results = ranking::discipline_results(state, state, discipline_id)?;
    match format {
        OutputFormat::Table => println!(
            "{}",
            output::format_ranking(&results, opts, output::should_use_colors())
        ),
        OutputFormat::Tsv => {
            let tsv = output::format_ranking_tsv(&results, opts.decimals);
            if !tsv.is_empty() {
                println!("{}", tsv);
            }
        }
        OutputFormat::Json => print_json(&results)?,
    }
    Ok(false)
}

fn run(command: Commands, state: &mut CampState, opts: &DisplayOptions) -> Result<bool> {
    let use_colors = output::should_use_colors();
    match command {
        // Handled before the store is opened
        Commands::Init { .. } => Ok(false),
        Commands::Child(cmd) => run_child(cmd, state, use_colors),
        Commands::Group(cmd) => run_group(cmd, state),
        Commands::Discipline(cmd) => run_discipline(cmd, state, use_colors),
        Commands::Record {
            child_id,
            discipline_id,
            value,
            attempt,
        } => run_record(state, child_id, discipline_id, value, attempt),
        Commands::Ranking {
            discipline_id,
            format,
        } => run_ranking(state, discipline_id, format, opts),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init { defaults, force } = cli.command {
        match camp_olympics::config::init::run_init(config_path, defaults, force) {
            Ok(path) => {
                println!("Wrote config to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    // Load config
    let config = match camp_olympics::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = camp_olympics::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let store_path = camp_olympics::config::resolve_store_path(cli.store, &config);
    tracing::debug!(path = %store_path.display(), "Using store");

    let mut state = match camp_olympics::store::load_state(&store_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Store error: {:#}", e);
            std::process::exit(EXIT_STORE);
        }
    };

    let opts = DisplayOptions::from(&config);
    match run(cli.command, &mut state, &opts) {
        Ok(true) => {
            if let Err(e) = camp_olympics::store::save_state(&store_path, &state) {
                eprintln!("Store error: {:#}", e);
                std::process::exit(EXIT_STORE);
            }
        }
        Ok(false) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code_for(&e));
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
