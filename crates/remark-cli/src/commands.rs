//! Command execution.
//!
//! Every command returns a [`remark_core::Result`]; the caller turns a
//! failure into a [`UserMessage`] for the operation that was attempted.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, info};

use remark_core::settings::{
    clear_session, load_boundary, load_session, save_boundary, save_session,
};
use remark_core::{
    validate_note, validate_password, validate_username, Annotation, AuthService,
    BoundaryPreference, Coordinates, Error, LandmarkBackend, LandmarkPipeline, Operation,
    OwnershipScope, Result, ScopeFilter, SettingsStore, UserMessage, UserSession,
};

use crate::{Commands, LocationArgs};

/// Backends a remote command runs against.
pub struct Context {
    pub landmarks: Arc<dyn LandmarkBackend>,
    pub auth: Arc<dyn AuthService>,
    pub settings: Arc<dyn SettingsStore>,
}

impl LocationArgs {
    pub fn coordinates(&self) -> Result<Option<Coordinates>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(Error::InvalidInput(
                "--lat and --lon must be given together".to_string(),
            )),
        }
    }
}

/// Commands that only touch local settings.
pub async fn execute_local(
    settings: &dyn SettingsStore,
    command: Commands,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Whoami => match load_session(settings).await? {
            Some(session) => writeln!(
                out,
                "{} (logged in since {})",
                session.username,
                session.logged_in_at.format("%Y-%m-%d %H:%M UTC")
            )?,
            None => writeln!(out, "Not logged in.")?,
        },
        Commands::Boundary { value: Some(boundary) } => {
            save_boundary(settings, boundary).await?;
            info!(
                subsystem = "cli",
                op = "boundary",
                boundary = %boundary,
                "Boundary preference saved"
            );
            writeln!(out, "Search boundary set to {}.", boundary)?;
        }
        Commands::Boundary { value: None } => {
            let current = load_boundary(settings).await?;
            for boundary in BoundaryPreference::ALL {
                let marker = if boundary == current { "*" } else { " " };
                writeln!(out, "{} {}", marker, boundary)?;
            }
        }
        other => {
            return Err(Error::Config(format!(
                "{:?} needs a backend connection",
                other
            )))
        }
    }
    Ok(())
}

/// Commands that talk to the landmark store or the user directory.
pub async fn execute(ctx: &Context, command: Commands, out: &mut dyn Write) -> Result<()> {
    let settings = ctx.settings.as_ref();
    match command {
        Commands::Signup { username, password } => {
            validate_username(&username)?;
            validate_password(&password)?;
            ctx.auth.sign_up(&username, &password).await?;
            print_success(out, Operation::SignUp)?;
        }
        Commands::Login { username, password } => {
            validate_username(&username)?;
            validate_password(&password)?;
            let session = ctx.auth.log_in(&username, &password).await?;
            save_session(settings, &session).await?;
            writeln!(out, "Logged in as {}.", session.username)?;
        }
        Commands::Logout => match load_session(settings).await? {
            Some(session) => {
                ctx.auth.log_out(&session).await?;
                clear_session(settings).await?;
                writeln!(out, "Logged out.")?;
            }
            None => writeln!(out, "Not logged in.")?,
        },
        Commands::List {
            location,
            search,
            scope,
            json,
        } => {
            let session = require_session(settings).await?;
            let current_location = location.coordinates()?;
            let boundary = load_boundary(settings).await?;
            let pipeline = LandmarkPipeline::new(Arc::clone(&ctx.landmarks));

            let fetched = pipeline
                .fetch_all(current_location, boundary, &session.username)
                .await?;
            let shown = match search.as_deref() {
                Some(query) => pipeline.search(query, scope).await,
                None if scope != ScopeFilter::All => pipeline.search("", scope).await,
                None => fetched.clone(),
            };
            debug!(
                subsystem = "cli",
                op = "list",
                result_count = shown.len(),
                "Listing landmarks"
            );

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&shown)?)?;
            } else {
                // Without a location the backend searched everywhere.
                let searched = if current_location.is_some() {
                    boundary
                } else {
                    BoundaryPreference::Unbounded
                };
                writeln!(out, "{}", UserMessage::fetch_summary(fetched.len(), searched))?;
                if shown.len() != fetched.len() {
                    writeln!(out, "{} of {} match.", shown.len(), fetched.len())?;
                }
                for annotation in &shown {
                    writeln!(out, "{}", format_annotation(annotation))?;
                }
            }
        }
        Commands::Add { lat, lon, note } => {
            let session = require_session(settings).await?;
            let note = validate_note(&note.join(" "))?;
            let location = Coordinates::new(lat, lon)?;
            let pipeline = LandmarkPipeline::new(Arc::clone(&ctx.landmarks));
            let created = pipeline.create(&session.username, &note, location).await?;
            print_success(out, Operation::Create)?;
            writeln!(out, "{}", format_annotation(&created))?;
        }
        Commands::Edit { id, note, location } => {
            let session = require_session(settings).await?;
            let note = validate_note(&note.join(" "))?;
            let current_location = location.coordinates()?;
            ensure_owner(ctx.landmarks.as_ref(), &id, &session).await?;
            let pipeline = LandmarkPipeline::new(Arc::clone(&ctx.landmarks));
            let updated = pipeline
                .update(&id, &note, current_location, &session.username)
                .await?;
            print_success(out, Operation::Update)?;
            writeln!(out, "{}", format_annotation(&updated))?;
        }
        Commands::Delete { id } => {
            let session = require_session(settings).await?;
            ensure_owner(ctx.landmarks.as_ref(), &id, &session).await?;
            let pipeline = LandmarkPipeline::new(Arc::clone(&ctx.landmarks));
            pipeline.delete(&id).await?;
            print_success(out, Operation::Delete)?;
        }
        local @ (Commands::Whoami | Commands::Boundary { .. }) => {
            execute_local(settings, local, out).await?;
        }
        Commands::Migrate => {
            return Err(Error::Config(
                "migrations run against the database only".to_string(),
            ))
        }
    }
    Ok(())
}

async fn require_session(settings: &dyn SettingsStore) -> Result<UserSession> {
    load_session(settings)
        .await?
        .ok_or_else(|| Error::Unauthorized("not logged in, run `remark login` first".to_string()))
}

/// Only the author may change a landmark.
///
/// Lookups that do not resolve to one record are left for the pipeline to
/// report as not found.
async fn ensure_owner(
    backend: &dyn LandmarkBackend,
    id: &str,
    session: &UserSession,
) -> Result<()> {
    if let [record] = backend.find_by_id(id).await?.as_slice() {
        if record.author != session.username {
            return Err(Error::Unauthorized(format!(
                "landmark {} belongs to {}",
                id, record.author
            )));
        }
    }
    Ok(())
}

pub fn print_migrated(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Migrations applied.")?;
    Ok(())
}

fn print_success(out: &mut dyn Write, op: Operation) -> Result<()> {
    if let Some(message) = UserMessage::for_success(op) {
        writeln!(out, "{}", message)?;
    }
    Ok(())
}

fn format_annotation(annotation: &Annotation) -> String {
    let scope = match annotation.scope {
        OwnershipScope::Mine => "mine",
        OwnershipScope::Others => "others",
    };
    format!(
        "{}  [{}]  {}  {}: {}",
        annotation.id,
        scope,
        annotation.distance_hint.as_deref().unwrap_or("-"),
        annotation.author,
        annotation.note
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use remark_core::mock::{MockAuthService, MockLandmarkBackend};
    use remark_core::MemorySettingsStore;

    struct Harness {
        ctx: Context,
        landmarks: MockLandmarkBackend,
    }

    fn harness() -> Harness {
        let landmarks = MockLandmarkBackend::new();
        let ctx = Context {
            landmarks: Arc::new(landmarks.clone()),
            auth: Arc::new(MockAuthService::new()),
            settings: Arc::new(MemorySettingsStore::new()),
        };
        Harness { ctx, landmarks }
    }

    async fn run(h: &Harness, command: Commands) -> Result<String> {
        let mut out = Vec::new();
        execute(&h.ctx, command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    async fn log_in_as(h: &Harness, username: &str) {
        run(
            h,
            Commands::Signup {
                username: username.to_string(),
                password: "secret".to_string(),
            },
        )
        .await
        .unwrap();
        run(
            h,
            Commands::Login {
                username: username.to_string(),
                password: "secret".to_string(),
            },
        )
        .await
        .unwrap();
    }

    fn here() -> LocationArgs {
        LocationArgs {
            lat: Some(-33.8568),
            lon: Some(151.2153),
        }
    }

    fn add(note: &str) -> Commands {
        Commands::Add {
            lat: -33.8568,
            lon: 151.2153,
            note: note.split(' ').map(str::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn test_signup_validates_username() {
        let h = harness();
        let err = run(
            &h,
            Commands::Signup {
                username: "x".to_string(),
                password: "secret".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_commands_require_login() {
        let h = harness();
        let err = run(&h, add("Opera house steps")).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let h = harness();
        log_in_as(&h, "alice").await;

        let added = run(&h, add("Opera house steps")).await.unwrap();
        assert!(added.starts_with("Success: You have just added a landmark."));
        assert!(added.contains("[mine]  just here  alice: Opera house steps"));

        let listed = run(
            &h,
            Commands::List {
                location: here(),
                search: None,
                scope: ScopeFilter::All,
                json: false,
            },
        )
        .await
        .unwrap();
        assert!(listed.contains("1 landmarks located after searching globally everywhere."));
        assert!(listed.contains("Opera house steps"));
    }

    #[tokio::test]
    async fn test_add_rejects_short_note() {
        let h = harness();
        log_in_as(&h, "alice").await;
        let err = run(&h, add("hi")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(h.landmarks.records().is_empty());
    }

    #[tokio::test]
    async fn test_list_search_and_json() {
        let h = harness();
        log_in_as(&h, "alice").await;
        run(&h, add("Opera house steps")).await.unwrap();
        run(&h, add("Botanic garden gate")).await.unwrap();

        let out = run(
            &h,
            Commands::List {
                location: LocationArgs {
                    lat: None,
                    lon: None,
                },
                search: Some("  OPERA ".to_string()),
                scope: ScopeFilter::All,
                json: true,
            },
        )
        .await
        .unwrap();
        let shown: Vec<Annotation> = serde_json::from_str(&out).unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].note, "Opera house steps");
        assert!(shown[0].distance_hint.is_none());
    }

    #[tokio::test]
    async fn test_edit_and_delete_require_ownership() {
        let h = harness();
        log_in_as(&h, "alice").await;
        run(&h, add("Opera house steps")).await.unwrap();
        let id = h.landmarks.records()[0].id.clone();

        log_in_as(&h, "bob").await;
        let err = run(
            &h,
            Commands::Edit {
                id: id.clone(),
                note: vec!["mine".to_string(), "now".to_string()],
                location: here(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        let err = run(&h, Commands::Delete { id: id.clone() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(h.landmarks.records().len(), 1);
    }

    #[tokio::test]
    async fn test_owner_edits_and_deletes() {
        let h = harness();
        log_in_as(&h, "alice").await;
        run(&h, add("Opera house steps")).await.unwrap();
        let id = h.landmarks.records()[0].id.clone();

        let edited = run(
            &h,
            Commands::Edit {
                id: id.clone(),
                note: vec!["Opera".to_string(), "forecourt".to_string()],
                location: here(),
            },
        )
        .await
        .unwrap();
        assert!(edited.contains("The landmark was updated with new remark."));
        assert_eq!(h.landmarks.records()[0].note, "Opera forecourt");

        let deleted = run(&h, Commands::Delete { id }).await.unwrap();
        assert!(deleted.contains("The landmark was deleted."));
        assert!(h.landmarks.records().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let h = harness();
        log_in_as(&h, "alice").await;
        let err = run(
            &h,
            Commands::Delete {
                id: "nope".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let h = harness();
        log_in_as(&h, "alice").await;
        assert!(run(&h, Commands::Whoami).await.unwrap().starts_with("alice"));
        assert_eq!(run(&h, Commands::Logout).await.unwrap(), "Logged out.\n");
        assert_eq!(run(&h, Commands::Whoami).await.unwrap(), "Not logged in.\n");
    }

    #[tokio::test]
    async fn test_boundary_round_trip() {
        let settings = MemorySettingsStore::new();
        let mut out = Vec::new();
        execute_local(
            &settings,
            Commands::Boundary {
                value: Some(BoundaryPreference::TenKm),
            },
            &mut out,
        )
        .await
        .unwrap();

        let mut out = Vec::new();
        execute_local(&settings, Commands::Boundary { value: None }, &mut out)
            .await
            .unwrap();
        let listing = String::from_utf8(out).unwrap();
        assert!(listing.contains("* 10km"));
        assert!(listing.contains("  planet"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_print_migrated_reports_write_failure() {
        let mut out = Vec::new();
        print_migrated(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Migrations applied.\n");

        assert!(matches!(
            print_migrated(&mut BrokenPipe),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_location_args_must_pair() {
        let half = LocationArgs {
            lat: Some(1.0),
            lon: None,
        };
        assert!(half.coordinates().is_err());
        let bad = LocationArgs {
            lat: Some(91.0),
            lon: Some(0.0),
        };
        assert!(bad.coordinates().is_err());
    }
}
