use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crackthru::logging::{self, LogBuffer};
use crackthru::prelude::*;
use crackthru::transport::{ReqwestTransport, TransportConfig};

/// Runs the account lifecycle against a CRACKTHRU API and reports each
/// step as PASS or FAIL.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// API base URL.
    #[arg(long, env = "CRACKTHRU_API_URL", default_value = "http://localhost:5000/api")]
    base_url: String,

    /// Account email. A unique address is generated when omitted.
    #[arg(long)]
    email: Option<String>,

    #[arg(long, default_value = "secret123")]
    password: String,

    /// Course to enroll the new account in.
    #[arg(long, env = "CRACKTHRU_CHECK_COURSE", default_value = "innovation-bootcamp")]
    course_id: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Show debug logs.
    #[arg(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

struct Outcome {
    name: &'static str,
    result: Result<String, String>,
}

struct Check {
    session: SessionManager<ReqwestTransport>,
    email: String,
    password: String,
    course_id: String,
}

impl Check {
    async fn register(&self) -> Result<String, String> {
        let form = SignupForm {
            name: "Registration Check".into(),
            email: self.email.clone(),
            password: self.password.clone(),
            organization: Some("CRACKTHRU QA".into()),
            country: Some("India".into()),
            ..Default::default()
        };
        let user = self.session.signup(&form).await.map_err(describe)?;
        Ok(format!("registered {} ({})", user.email, user.user_id))
    }

    async fn login(&self) -> Result<String, String> {
        let user = self
            .session
            .login(&self.email, &self.password)
            .await
            .map_err(describe)?;
        Ok(format!("logged in as {}", user.name))
    }

    async fn profile(&self) -> Result<String, String> {
        match self.session.check_auth().await {
            SessionState::Authenticated(user) if user.email.eq_ignore_ascii_case(&self.email) => {
                Ok(format!("profile for {}", user.email))
            }
            SessionState::Authenticated(user) => {
                Err(format!("profile belongs to {}, expected {}", user.email, self.email))
            }
            other => Err(format!("session is {}", other.label())),
        }
    }

    async fn refresh(&self) -> Result<String, String> {
        if self.session.refresh().await {
            Ok("session refreshed".into())
        } else {
            Err("refresh rejected; session ended".into())
        }
    }

    async fn enroll(&self) -> Result<String, String> {
        let enrollment = self.session.enroll(&self.course_id).await.map_err(describe)?;
        Ok(format!("enrolled in {} ({})", enrollment.course.title, enrollment.id))
    }

    async fn enrollments(&self) -> Result<String, String> {
        let list = self.session.get_enrollments().await;
        if list.iter().any(|e| e.course.id == self.course_id) {
            Ok(format!("{} enrollment(s) listed", list.len()))
        } else {
            Err(format!("{} not among {} enrollment(s)", self.course_id, list.len()))
        }
    }

    async fn logout(&self) -> Result<String, String> {
        self.session.logout().await;
        match self.session.state() {
            SessionState::Unauthenticated => Ok("logged out".into()),
            other => Err(format!("session is still {}", other.label())),
        }
    }

    async fn profile_after_logout(&self) -> Result<String, String> {
        match self.session.check_auth().await {
            SessionState::Authenticated(user) => {
                Err(format!("server still returns profile for {}", user.email))
            }
            _ => Ok("profile refused without a session".into()),
        }
    }
}

fn describe(e: SessionError) -> String {
    format!("{} ({e})", e.user_message())
}

fn unique_email() -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("check+{stamp}@crackthru.test")
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<ExitCode, CrackthruError> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    if let Err(e) = logging::init_with(LogBuffer::default(), level) {
        eprintln!("logging disabled: {e}");
    }

    let transport = ReqwestTransport::new(TransportConfig {
        base_url: args.base_url.clone(),
        timeout: Duration::from_secs(args.timeout),
    })?;
    let check = Check {
        session: SessionManager::new(transport, SessionConfig::default()),
        email: args.email.unwrap_or_else(unique_email),
        password: args.password,
        course_id: args.course_id,
    };
    println!("Checking {} as {}\n", args.base_url, check.email);

    let outcomes = vec![
        Outcome { name: "register", result: check.register().await },
        Outcome { name: "login", result: check.login().await },
        Outcome { name: "profile", result: check.profile().await },
        Outcome { name: "refresh", result: check.refresh().await },
        Outcome { name: "enroll", result: check.enroll().await },
        Outcome { name: "enrollments", result: check.enrollments().await },
        Outcome { name: "logout", result: check.logout().await },
        Outcome { name: "profile-after-logout", result: check.profile_after_logout().await },
    ];

    for outcome in &outcomes {
        match &outcome.result {
            Ok(detail) => println!("PASS  {:<22} {detail}", outcome.name),
            Err(detail) => println!("FAIL  {:<22} {detail}", outcome.name),
        }
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    println!("\n{} passed, {failed} failed", outcomes.len() - failed);
    tracing::debug!(failed, "registration check finished");

    check.session.shutdown();
    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
