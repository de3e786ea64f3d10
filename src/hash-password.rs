//! A simple CLI tool for producing the `admin_password_hash` config value.
//! The output is an argon2 encoded hash, exactly as verified by the server's
//! shared password authenticator.

use clap::{Arg, ArgAction, ArgMatches, Command};
use rand::Rng;

const PROGRAM_NAME: &str = "hash-password";

const ABOUT_TEXT: &str = "Hash the shared admin password for the audit backend.

Prints an argon2 encoded hash suitable for the `admin_password_hash` setting
(or the `ROCKET_ADMIN_PASSWORD_HASH` environment variable).";

const PASSWORD: &str = "PASSWORD";

const PASSWORD_HELP: &str = "The password to hash";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(PASSWORD)
            .help(PASSWORD_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Hash the password with a fresh random salt.
fn hash(password: &str) -> Result<String, argon2::Error> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())
}

fn run(args: &ArgMatches) -> i32 {
    let password = args
        .get_one::<String>(PASSWORD)
        .expect("Required argument");
    if password.is_empty() {
        eprintln!("Password must not be empty");
        return 2;
    }
    match hash(password) {
        Ok(encoded) => {
            println!("{encoded}");
            0
        }
        Err(e) => {
            eprintln!("Failed to hash password: {e}");
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    std::process::exit(run(&args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies() {
        let encoded = hash("hunter2").unwrap();
        assert!(encoded.starts_with("$argon2"));
        assert!(argon2::verify_encoded(&encoded, b"hunter2").unwrap());
        assert!(!argon2::verify_encoded(&encoded, b"hunter3").unwrap());
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash("hunter2").unwrap(), hash("hunter2").unwrap());
    }

    #[test]
    fn empty_password_rejected() {
        let args = cli().get_matches_from([PROGRAM_NAME, ""]);
        assert_eq!(run(&args), 2);
    }
}
