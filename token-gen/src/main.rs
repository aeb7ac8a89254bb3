use chrono::TimeDelta;
use clap::Parser;

use api_scaffold::services::auth::{DEFAULT_TOKEN_TTL_SECONDS, TokenService};

/// Mint an HS256 identity token signed with the API's shared secret.
///
/// Useful for calling protected routes by hand:
/// - a valid token for any subject
/// - an already-expired token (negative `--ttl-seconds`) to check the 403 path
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Shared secret; must match the server's JWT_SECRET
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    /// Subject stored in the `name` claim
    #[arg(long, default_value = "alice")]
    name: String,

    /// Token lifetime in seconds. Negative values mint an expired token.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECONDS, allow_hyphen_values = true)]
    ttl_seconds: i64,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.secret.is_empty() {
        return Err("secret must not be empty".into());
    }

    let ttl = TimeDelta::try_seconds(args.ttl_seconds).ok_or("ttl out of range")?;
    let tokens = TokenService::new(args.secret.as_bytes()).with_ttl(ttl);
    let token = tokens.issue(&args.name)?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    let claims = tokens.verify(&token);

    println!("token: {}", token);
    println!("subject: {}", args.name);
    println!("ttl: {}s", args.ttl_seconds);
    match claims {
        Ok(claims) => println!("expires_at: {}", claims.expires_at.to_rfc3339()),
        Err(e) => println!("status: {}", e),
    }
    println!("header: Authorization: Bearer {}", token);

    Ok(())
}
