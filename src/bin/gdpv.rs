use anyhow::{Context, Result, anyhow, bail};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gdp_viewer::{ApiError, Client, ClientConfig, Indicator, YearRange};
use gdp_viewer::{stats, storage, viz};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gdpv",
    version,
    about = "Fetch and chart GDP, GDP per capita and population from the World Bank"
)]
struct Cli {
    /// JSON config file (base_url, http_proxy, https_proxy, timeout_secs, ...).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Proxy for both HTTP and HTTPS requests (e.g., http://127.0.0.1:7890).
    #[arg(long, global = true)]
    proxy: Option<String>,
    /// Override the API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List countries (aggregates excluded) with their ISO codes.
    Countries(CountriesArgs),
    /// Print one indicator for one country as year/value lines.
    Series(SeriesArgs),
    /// Fetch GDP and GDP per capita (optionally population); plot, save and summarize.
    Profile(ProfileArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct YearArgs {
    /// First year (inclusive).
    #[arg(long, default_value_t = 1990)]
    from: i32,
    /// Last year (inclusive).
    #[arg(long, default_value_t = 2022)]
    to: i32,
}

impl YearArgs {
    fn range(&self) -> Result<YearRange> {
        let range = YearRange::new(self.from, self.to);
        range
            .validate(latest_year())
            .map_err(|msg| anyhow!("invalid year range: {}", msg))?;
        Ok(range)
    }
}

#[derive(Args, Debug)]
struct CountriesArgs {
    /// Only show names containing this text (case-insensitive).
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    /// Indicator code (e.g., NY.GDP.MKTP.CD).
    #[arg(short, long)]
    indicator: String,
    /// ISO country code (e.g., USA or DE).
    #[arg(short, long)]
    country: String,
    #[command(flatten)]
    years: YearArgs,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Country name as listed by `gdpv countries`, or an ISO code.
    #[arg(short, long)]
    country: String,
    #[command(flatten)]
    years: YearArgs,
    /// Also fetch total population.
    #[arg(long, default_value_t = false)]
    population: bool,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 700).
    #[arg(long, default_value_t = 700)]
    height: u32,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print summary statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn latest_year() -> i32 {
    chrono::Local::now().year()
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn with_hint(err: ApiError) -> anyhow::Error {
    if err.is_transport() {
        anyhow::Error::new(err).context("request failed; check the network connection or --proxy")
    } else {
        err.into()
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(proxy) = &cli.proxy {
        config = config.with_proxy(proxy.clone());
    }
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = build_config(&cli)?;
    let mut client = Client::new(&config)?;
    match cli.cmd {
        Command::Countries(args) => cmd_countries(&mut client, args),
        Command::Series(args) => cmd_series(&client, args),
        Command::Profile(args) => cmd_profile(&mut client, args),
    }
}

fn cmd_countries(client: &mut Client, args: CountriesArgs) -> Result<()> {
    let names = client.try_list_countries().map_err(with_hint)?;
    let needle = args.filter.as_deref().map(str::to_lowercase);
    let mut shown = 0usize;
    for name in &names {
        if let Some(n) = &needle
            && !name.to_lowercase().contains(n.as_str())
        {
            continue;
        }
        let code = client.code_for_name(name).unwrap_or("?");
        println!("{}\t{}", code, name);
        shown += 1;
    }
    eprintln!("{} of {} countries", shown, names.len());
    Ok(())
}

fn cmd_series(client: &Client, args: SeriesArgs) -> Result<()> {
    let range = args.years.range()?;
    let series = client
        .try_fetch_indicator(&args.indicator, &args.country, range)
        .map_err(with_hint)
        .with_context(|| format!("fetch {} for {}", args.indicator, args.country))?;
    for (year, value) in series.points() {
        println!("{}\t{}", year, fmt_opt(Some(value)));
    }
    Ok(())
}

fn cmd_profile(client: &mut Client, args: ProfileArgs) -> Result<()> {
    let range = args.years.range()?;
    let code = client.resolve_country(&args.country).ok_or_else(|| {
        anyhow!(
            "unknown country {:?}; run `gdpv countries` to list names",
            args.country
        )
    })?;
    // Chart title: the directory name when the directory is loaded, else the resolved code.
    let country_name = client
        .name_for_code(&code)
        .unwrap_or(code.as_str())
        .to_string();
    let country_name = country_name.as_str();

    let profile = client.fetch_country_profile(&code, range, args.population);
    let missing = profile.missing();
    if missing.len() == profile.series.len() {
        bail!("no data returned for {} ({})", country_name, code);
    }
    for indicator in &missing {
        eprintln!("warning: {} could not be fetched", indicator.label());
    }

    let mut did_something = false;

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&profile, path)?,
            "json" => storage::save_json(&profile, path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", profile.rows().len(), path.display());
        did_something = true;
    }

    if let Some(plot_path) = args.plot.as_ref() {
        viz::render_profile(&profile, country_name, plot_path, args.width, args.height)?;
        eprintln!("Wrote plot to {}", plot_path.display());
        did_something = true;
    }

    if args.stats {
        for s in stats::profile_summary(&profile) {
            println!(
                "{} • {}  count={}  min={} max={} mean={} median={}  {}-{} growth={}%/yr",
                code,
                s.indicator.label(),
                s.count,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median),
                s.first_year.map_or("NA".to_string(), |y| y.to_string()),
                s.last_year.map_or("NA".to_string(), |y| y.to_string()),
                fmt_opt(s.cagr_pct)
            );
        }
        did_something = true;
    }

    if !did_something {
        print_table(&profile);
    }
    Ok(())
}

/// Year per line, one column per requested indicator (empty when the year has no value).
fn print_table(profile: &gdp_viewer::CountryProfile) {
    let indicators: Vec<Indicator> = profile.requested().collect();
    let header: Vec<&str> = indicators.iter().map(|i| i.key()).collect();
    println!("year\t{}", header.join("\t"));
    for year in profile.range.start..=profile.range.end {
        let key = year.to_string();
        let cells: Vec<String> = indicators
            .iter()
            .map(|i| {
                profile
                    .get(*i)
                    .and_then(|s| s.get(&key))
                    .map(|v| fmt_opt(Some(v)))
                    .unwrap_or_default()
            })
            .collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        println!("{}\t{}", year, cells.join("\t"));
    }
}
