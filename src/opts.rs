use clap::{Arg, Command};

pub const ARGS_PORT: &str = "port";

#[derive(Debug, Clone)]
pub struct ProcArgs {
    pub port: String,
}

fn build_cli_args() -> Command {
    Command::new("proxy")
        .disable_help_subcommand(true)
        .about("A forwarding HTTP proxy with header rewriting and keyword content filtering")
        .arg(
            Arg::new(ARGS_PORT)
                .help("Local TCP port to listen on")
                .value_name("PORT")
                .required(true),
        )
}

// On a missing or non-numeric port, prints a usage message and returns
// Err(()); the caller exits with status 255.
pub fn parse_args() -> Result<ProcArgs, ()> {
    parse_args_from(std::env::args_os())
}

fn parse_args_from<I, T>(args: I) -> Result<ProcArgs, ()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = match build_cli_args().try_get_matches_from(args) {
        Ok(m) => m,
        Err(_) => {
            print_usage();
            return Err(());
        }
    };

    let port = matches
        .get_one::<String>(ARGS_PORT)
        .expect("port is a required argument")
        .clone();

    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        print_usage();
        return Err(());
    }

    Ok(ProcArgs { port })
}

fn print_usage() {
    println!("usage: proxy <port>");
    println!("  <port> must consist solely of decimal digits");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_port() {
        let args = parse_args_from(["proxy", "8080"]).unwrap();
        assert_eq!(args.port, "8080");
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(parse_args_from(["proxy", "abc"]).is_err());
    }

    #[test]
    fn rejects_signed_port() {
        assert!(parse_args_from(["proxy", "+8080"]).is_err());
    }

    #[test]
    fn rejects_missing_port() {
        assert!(parse_args_from(["proxy"]).is_err());
    }
}
