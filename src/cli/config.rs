//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::{config::ClientConfig, models::SessionCredential};
use anyhow::{Context, Result};

/// Convert CLI arguments to the client configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build a `ClientConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<ClientConfig> {
        let config = ClientConfig::builder()
            .base_url(cli.base_url.trim())
            .user_agent(&cli.user_agent)
            .timeout_secs(cli.timeout)
            .build()
            .context("Failed to build client configuration")?;
        Ok(config)
    }

    /// Parse the `--session` / `INPAINT_SESSION` value, if given
    pub(crate) fn session(cli: &Cli) -> Result<Option<SessionCredential>> {
        cli.session
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(SessionCredential::parse)
            .transpose()
            .context("Session must be a cookie value without ';' or whitespace")
    }
}

/// Rectangle given as `X,Y,WIDTH,HEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionArg {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Line given as `X0,Y0,X1,Y1[,THICKNESS]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeArg {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub thickness: u32,
}

fn split_numbers(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).collect()
}

fn number<T: std::str::FromStr>(field: &str, name: &str) -> std::result::Result<T, String> {
    field
        .parse()
        .map_err(|_| format!("invalid {name} '{field}'"))
}

/// Parse a `--region` value
pub fn parse_region(raw: &str) -> std::result::Result<RegionArg, String> {
    match split_numbers(raw).as_slice() {
        [x, y, width, height] => Ok(RegionArg {
            x: number(x, "x")?,
            y: number(y, "y")?,
            width: number(width, "width")?,
            height: number(height, "height")?,
        }),
        _ => Err(format!("expected X,Y,WIDTH,HEIGHT, got '{raw}'")),
    }
}

/// Parse a `--stroke` value; thickness defaults to 1
pub fn parse_stroke(raw: &str) -> std::result::Result<StrokeArg, String> {
    let fields = split_numbers(raw);
    let (coords, thickness) = match fields.as_slice() {
        [x0, y0, x1, y1] => ([*x0, *y0, *x1, *y1], 1),
        [x0, y0, x1, y1, t] => ([*x0, *y0, *x1, *y1], number(t, "thickness")?),
        _ => return Err(format!("expected X0,Y0,X1,Y1[,THICKNESS], got '{raw}'")),
    };
    Ok(StrokeArg {
        from: (number(coords[0], "x0")?, number(coords[1], "y0")?),
        to: (number(coords[2], "x1")?, number(coords[3], "y1")?),
        thickness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_region() {
        assert_eq!(
            parse_region("2, 3,10,4").unwrap(),
            RegionArg {
                x: 2,
                y: 3,
                width: 10,
                height: 4
            }
        );
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("1,2,-3,4").is_err());
    }

    #[test]
    fn test_parse_stroke() {
        let stroke = parse_stroke("0,0,9,9").unwrap();
        assert_eq!(stroke.from, (0, 0));
        assert_eq!(stroke.to, (9, 9));
        assert_eq!(stroke.thickness, 1);

        assert_eq!(parse_stroke("-1,0,5,5,3").unwrap().thickness, 3);
        assert!(parse_stroke("0,0,9").is_err());
        assert!(parse_stroke("0,0,9,9,x").is_err());
    }

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "inpaint-client",
            "--base-url",
            "http://127.0.0.1:9000/",
            "--timeout",
            "5",
            "list",
        ]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.site().unwrap().root().as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_session_argument() {
        let cli = Cli::parse_from(["inpaint-client", "--session", "connect.sid=abc", "list"]);
        let session = CliConfigBuilder::session(&cli).unwrap().unwrap();
        assert_eq!(session.value(), "abc");

        let cli = Cli::parse_from(["inpaint-client", "--session", "a b", "list"]);
        assert!(CliConfigBuilder::session(&cli).is_err());
    }
}
