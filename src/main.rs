use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use geotz::config::Config;
use geotz::location::Address;
use geotz::server::dto::{TimeConversionRequestDto, TimeConversionResponseDto, TimezoneResponseDto};
use geotz::server::{self, AppState};
use geotz::timezone::{TimeConversionService, TimezoneRequest};

/// geotz — resolve street addresses to IANA timezone identifiers.
///
/// Examples:
///   geotz serve
///   geotz resolve --city "New York" --country US
///   geotz convert --from Europe/London --to Asia/Tokyo --time 2024-01-01T23:00:00
#[derive(Parser)]
#[command(name = "geotz", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server.
    Serve {
        /// Bind host override.
        #[arg(long)]
        host: Option<String>,

        /// Bind port override.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Resolve one address and print the timezone response as JSON.
    Resolve {
        #[arg(long, default_value = "")]
        line1: String,

        #[arg(long, default_value = "")]
        line2: String,

        #[arg(long, default_value = "")]
        city: String,

        /// State or province.
        #[arg(long, default_value = "")]
        state: String,

        #[arg(long, default_value = "")]
        postal_code: String,

        /// ISO 3166-1 alpha-2 code restricts the search to one country.
        #[arg(long, default_value = "")]
        country: String,
    },

    /// Convert a wall-clock time between two timezones.
    Convert {
        /// Origin timezone id (e.g. Europe/London).
        #[arg(long)]
        from: String,

        /// Destination timezone id (e.g. Asia/Tokyo).
        #[arg(long)]
        to: String,

        /// Wall-clock time in the origin zone (ISO-8601).
        #[arg(long)]
        time: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geotz=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { host, port } => {
            let mut config = Config::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            server::start(&config).await
        }

        Command::Resolve {
            line1,
            line2,
            city,
            state,
            postal_code,
            country,
        } => {
            let config = Config::from_env()?;
            let app = AppState::from_config(&config)?;

            let address = Address {
                address_line1: line1,
                address_line2: line2,
                city,
                state_or_province: state,
                postal_code,
                country,
            };
            let response = app.pipeline.get_timezone(TimezoneRequest { address }).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&TimezoneResponseDto::from(response))?
            );
            Ok(())
        }

        Command::Convert { from, to, time } => {
            let dto = TimeConversionRequestDto {
                origin_time_zone_id: from,
                destination_time_zone_id: to,
                time,
            };
            let request = dto.to_model().map_err(|problems| anyhow!(problems.join(" ")))?;
            let response = TimeConversionService::new().convert(request);
            println!(
                "{}",
                serde_json::to_string_pretty(&TimeConversionResponseDto::from(response))?
            );
            Ok(())
        }
    }
}
