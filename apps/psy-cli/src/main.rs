use clap::{Args, Parser, Subcommand};
use psy_app::{
    AppError, AppResult, CalculationSession, DerivedQuantities, ExecutionMode, ResultEntry,
    ResultValue, RunConfig, SolveMode, derive_quantities, load_run_config, summarize,
};
use psy_core::units::constants::{G0_MPS2, KELVIN_OFFSET, STANDARD_PRESSURE_HPA};
use psy_core::{PressureUnit, TemperatureUnit};
use psy_models::{FormulaEntry, TemperatureSweep, find_formula, formula, tabulate};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "psy-cli")]
#[command(about = "Psychro CLI - wet-bulb, dew-point and humidity across saturation formulas", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Temperature unit for inputs and display (c, k, f)
    #[arg(long, global = true, default_value = "c")]
    temp_unit: TemperatureUnit,
    /// Pressure unit for inputs and display (hpa, pa, mmhg, cmhg, bar)
    #[arg(long, global = true, default_value = "hpa")]
    pressure_unit: PressureUnit,
    /// Run config YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit JSON (canonical °C / hPa) instead of text
    #[arg(long, global = true)]
    json: bool,
    /// Convergence tolerance as decimal digits (2..=10)
    #[arg(long, global = true)]
    precision: Option<u32>,
    /// Solve formulas in parallel
    #[arg(long, global = true)]
    parallel: bool,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Wet-bulb temperature from dry bulb and dew point
    WetBulb {
        #[arg(long)]
        dry_bulb: f64,
        #[arg(long)]
        dew_point: f64,
        /// Defaults to standard sea-level pressure
        #[arg(long)]
        pressure: Option<f64>,
        /// Initial wet-bulb guess (defaults to the configured strategy)
        #[arg(long)]
        guess: Option<f64>,
    },
    /// Dew point from dry bulb and wet bulb
    DewPoint {
        #[arg(long)]
        dry_bulb: f64,
        #[arg(long)]
        wet_bulb: f64,
        #[arg(long)]
        pressure: Option<f64>,
    },
    /// Dew point and wet bulb from dry bulb and relative humidity [%]
    Both {
        #[arg(long)]
        dry_bulb: f64,
        #[arg(long)]
        rh: f64,
        #[arg(long)]
        pressure: Option<f64>,
        #[arg(long)]
        guess: Option<f64>,
    },
    /// Derived humidity and thermodynamic quantities for one formula
    Derive {
        #[arg(long)]
        formula: String,
        #[arg(long)]
        dry_bulb: f64,
        #[arg(long)]
        dew_point: f64,
        #[arg(long)]
        wet_bulb: f64,
        /// Relative humidity [%]
        #[arg(long)]
        rh: f64,
        #[arg(long)]
        pressure: Option<f64>,
        /// Local gravity [m/s²]
        #[arg(long, default_value_t = G0_MPS2)]
        gravity: f64,
    },
    /// List saturation formulas, optionally filtered
    Formulas {
        query: Option<String>,
    },
    /// Tabulate esat and its derivative for one formula
    Table {
        formula: String,
        /// Start temperature (defaults to the formula's lower limit)
        #[arg(long)]
        start: Option<f64>,
        /// End temperature (defaults to the formula's upper limit)
        #[arg(long)]
        end: Option<f64>,
        #[arg(long, default_value_t = 11)]
        points: usize,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let level = match cli.global.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let ctx = Context::new(&cli.global)?;

    match cli.command {
        Commands::WetBulb {
            dry_bulb,
            dew_point,
            pressure,
            guess,
        } => cmd_wet_bulb(&ctx, dry_bulb, dew_point, pressure, guess),
        Commands::DewPoint {
            dry_bulb,
            wet_bulb,
            pressure,
        } => cmd_dew_point(&ctx, dry_bulb, wet_bulb, pressure),
        Commands::Both {
            dry_bulb,
            rh,
            pressure,
            guess,
        } => cmd_both(&ctx, dry_bulb, rh, pressure, guess),
        Commands::Derive {
            formula,
            dry_bulb,
            dew_point,
            wet_bulb,
            rh,
            pressure,
            gravity,
        } => cmd_derive(
            &ctx, &formula, dry_bulb, dew_point, wet_bulb, rh, pressure, gravity,
        ),
        Commands::Formulas { query } => cmd_formulas(&ctx, query.as_deref().unwrap_or("")),
        Commands::Table {
            formula,
            start,
            end,
            points,
        } => cmd_table(&ctx, &formula, start, end, points),
    }
}

/// Resolved global settings plus unit conversion at the edge.
struct Context {
    config: RunConfig,
    temp_unit: TemperatureUnit,
    pressure_unit: PressureUnit,
    json: bool,
}

impl Context {
    fn new(args: &GlobalArgs) -> AppResult<Self> {
        let mut config = match &args.config {
            Some(path) => load_run_config(path)?,
            None => RunConfig::default(),
        };
        if let Some(digits) = args.precision {
            config = config.with_precision_digits(digits)?;
        }
        if args.parallel {
            config.execution = ExecutionMode::Parallel;
        }
        Ok(Self {
            config,
            temp_unit: args.temp_unit,
            pressure_unit: args.pressure_unit,
            json: args.json,
        })
    }

    fn to_c(&self, t: f64) -> f64 {
        self.temp_unit.to_celsius(t)
    }

    fn show_t(&self, t_c: f64) -> String {
        format!("{:.3} {}", self.temp_unit.from_celsius(t_c), self.temp_unit)
    }

    fn to_hpa(&self, p: Option<f64>) -> f64 {
        p.map(|p| self.pressure_unit.to_hpa(p))
            .unwrap_or(STANDARD_PRESSURE_HPA)
    }

    fn show_p(&self, p_hpa: f64) -> String {
        format!("{:.2} {}", self.pressure_unit.from_hpa(p_hpa), self.pressure_unit)
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{}", text);
    Ok(())
}

fn cmd_wet_bulb(
    ctx: &Context,
    dry_bulb: f64,
    dew_point: f64,
    pressure: Option<f64>,
    guess: Option<f64>,
) -> AppResult<()> {
    let t = ctx.to_c(dry_bulb);
    let td = ctx.to_c(dew_point);
    let p = ctx.to_hpa(pressure);
    let guess = guess
        .map(|g| ctx.to_c(g))
        .unwrap_or_else(|| ctx.config.guess_from_dew_point(t, td));

    let session =
        CalculationSession::run_wet_bulb(guess, t, td, p, &ctx.config.wet_bulb_options())?;
    report_session(ctx, &session)
}

fn cmd_dew_point(
    ctx: &Context,
    dry_bulb: f64,
    wet_bulb: f64,
    pressure: Option<f64>,
) -> AppResult<()> {
    let t = ctx.to_c(dry_bulb);
    let tw = ctx.to_c(wet_bulb);
    let p = ctx.to_hpa(pressure);

    let session = CalculationSession::run_dew_point(t, tw, p, &ctx.config.dew_point_options())?;
    report_session(ctx, &session)
}

fn cmd_both(
    ctx: &Context,
    dry_bulb: f64,
    rh: f64,
    pressure: Option<f64>,
    guess: Option<f64>,
) -> AppResult<()> {
    let t = ctx.to_c(dry_bulb);
    let p = ctx.to_hpa(pressure);
    let guess = guess
        .map(|g| ctx.to_c(g))
        .unwrap_or_else(|| ctx.config.guess_from_relative_humidity(t, rh));

    let session = CalculationSession::run_both(guess, t, rh, p, &ctx.config.wet_bulb_options())?;
    report_session(ctx, &session)
}

fn report_session(ctx: &Context, session: &CalculationSession) -> AppResult<()> {
    if ctx.json {
        return print_json(session);
    }

    let inputs = session.inputs();
    println!(
        "Dry bulb {}, pressure {}",
        ctx.show_t(inputs.dry_bulb_c),
        ctx.show_p(inputs.pressure_hpa)
    );
    let (primary, secondary) = match inputs.mode {
        SolveMode::WetBulb => ("wet bulb", None),
        SolveMode::DewPoint => ("dew point", None),
        SolveMode::Both => ("dew point", Some("wet bulb")),
    };

    for (index, result) in session.results().iter().enumerate() {
        println!("{:>2}  {}", index, format_row(ctx, result, primary, secondary));
    }

    let summary = summarize(session);
    println!();
    for (outcome, count) in &summary.outcomes {
        println!("  {}: {}", outcome, count);
    }
    Ok(())
}

fn format_row(
    ctx: &Context,
    result: &ResultEntry,
    primary: &str,
    secondary: Option<&str>,
) -> String {
    let show = |value: ResultValue| match value {
        ResultValue::Temperature(t) => ctx.show_t(t),
        ResultValue::Failure(outcome) => outcome.to_string(),
    };

    let mut line = format!(
        "{:<18} {}: {}",
        result.formula.as_str(),
        primary,
        show(result.primary)
    );
    if let (Some(label), Some(value)) = (secondary, result.secondary) {
        line.push_str(&format!("  {}: {}", label, show(value)));
    }
    if let Some(rh) = result.relative_humidity {
        line.push_str(&format!("  RH: {:.2}%", rh * 100.0));
    }
    line
}

#[allow(clippy::too_many_arguments)]
fn cmd_derive(
    ctx: &Context,
    formula_name: &str,
    dry_bulb: f64,
    dew_point: f64,
    wet_bulb: f64,
    rh: f64,
    pressure: Option<f64>,
    gravity: f64,
) -> AppResult<()> {
    if !(0.0..=100.0).contains(&rh) {
        return Err(AppError::InvalidInput(format!(
            "relative humidity {} % must be within 0..=100",
            rh
        )));
    }
    let derived = derive_quantities(
        formula_name,
        ctx.to_c(dry_bulb),
        ctx.to_c(dew_point),
        ctx.to_c(wet_bulb),
        ctx.to_hpa(pressure),
        rh / 100.0,
        gravity,
    )?;

    if ctx.json {
        return print_json(&derived);
    }
    print_derived(ctx, &derived);
    Ok(())
}

fn print_derived(ctx: &Context, d: &DerivedQuantities) {
    let kelvin = |t_k: f64| ctx.show_t(t_k - KELVIN_OFFSET);

    println!("{} | derived quantities", d.formula);
    println!("  Relative humidity:        {:.2}%", d.relative_humidity * 100.0);
    println!("  Vapour pressure:          {}", ctx.show_p(d.vapour_pressure_hpa));
    println!(
        "  Saturation pressure:      {}",
        ctx.show_p(d.saturation_vapour_pressure_hpa)
    );
    println!(
        "  Wet-bulb esat:            {}",
        ctx.show_p(d.wet_bulb_vapour_pressure_hpa)
    );
    println!("  Dry-air pressure:         {}", ctx.show_p(d.dry_air_pressure_hpa));
    println!("  Dry-air density:          {:.4} kg/m³", d.dry_air_density);
    println!("  Vapour density:           {:.4} kg/m³", d.vapour_density);
    println!("  Moist-air density:        {:.4} kg/m³", d.moist_air_density);
    println!("  Mixing ratio:             {:.3} g/kg", d.mixing_ratio * 1000.0);
    println!(
        "  Saturation mixing ratio:  {:.3} g/kg",
        d.saturation_mixing_ratio * 1000.0
    );
    println!("  Specific humidity:        {:.3} g/kg", d.specific_humidity * 1000.0);
    println!("  Absolute humidity:        {:.3} g/m³", d.absolute_humidity);
    println!("  Latent heat:              {:.1} kJ/kg", d.latent_heat);
    println!("  Enthalpy:                 {:.2} kJ/kg", d.enthalpy);
    println!("  Virtual temperature:      {}", kelvin(d.virtual_temperature_k));
    println!("  Potential temperature:    {}", kelvin(d.potential_temperature_k));
    println!(
        "  Equivalent pot. temp.:    {}",
        kelvin(d.equivalent_potential_temperature_k)
    );
    println!(
        "  Virtual pot. temp.:       {}",
        kelvin(d.virtual_potential_temperature_k)
    );
    match (d.lcl_temperature_c, d.lcl_pressure_hpa, d.lcl_height_m) {
        (Some(t), Some(p), Some(z)) => {
            println!("  LCL temperature:          {}", ctx.show_t(t));
            println!("  LCL pressure:             {}", ctx.show_p(p));
            println!("  LCL height:               {:.0} m", z);
        }
        _ => println!("  LCL:                      undefined"),
    }
}

fn cmd_formulas(ctx: &Context, query: &str) -> AppResult<()> {
    let entries = find_formula(query);
    if ctx.json {
        let listing: Vec<FormulaListing> = entries.iter().map(FormulaListing::from).collect();
        return print_json(&listing);
    }

    if entries.is_empty() {
        println!("No formulas match '{}'", query);
        return Ok(());
    }
    for entry in &entries {
        println!(
            "  {:<18} {:<32} {:<5} {}",
            entry.name(),
            entry.display_name,
            entry.surface.to_string(),
            entry.validity.to_string()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct FormulaListing {
    id: &'static str,
    display_name: &'static str,
    surface: psy_models::Surface,
    min_c: f64,
    max_c: f64,
    family: &'static str,
}

impl From<&FormulaEntry> for FormulaListing {
    fn from(entry: &FormulaEntry) -> Self {
        Self {
            id: entry.name(),
            display_name: entry.display_name,
            surface: entry.surface,
            min_c: entry.validity.min_c,
            max_c: entry.validity.max_c,
            family: entry.model.family(),
        }
    }
}

fn cmd_table(
    ctx: &Context,
    formula_name: &str,
    start: Option<f64>,
    end: Option<f64>,
    points: usize,
) -> AppResult<()> {
    let entry = formula(formula_name)?;
    let start = start.map(|t| ctx.to_c(t)).unwrap_or(entry.validity.min_c);
    let end = end.map(|t| ctx.to_c(t)).unwrap_or(entry.validity.max_c);
    let sweep = TemperatureSweep::new(start, end, points)?;
    let table = tabulate(entry, &sweep);

    if ctx.json {
        return print_json(&table);
    }

    println!("{} over {}", entry.name(), entry.validity);
    for point in &table {
        let esat = point
            .esat_hpa
            .map(|e| ctx.show_p(e))
            .unwrap_or_else(|| "-".to_string());
        let slope = point
            .desat_dt
            .map(|d| format!("{:.5} hPa/°C", d))
            .unwrap_or_else(|| "-".to_string());
        let flag = if point.in_range { "" } else { "  (out of range)" };
        println!("  {:>14}  {:>16}  {:>18}{}", ctx.show_t(point.temperature_c), esat, slope, flag);
    }
    Ok(())
}
