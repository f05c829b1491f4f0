// ============================================================================
// civicecho - command-line client for the CivicEcho complaint portal
// ============================================================================
// Usage:
//   civicecho login --nid BD1 --password secret --role citizen
//   civicecho dashboard --status pending --search pothole
//   civicecho submit --title "..." --description "..." --category utilities \
//       --district Dhaka --upazila Dhanmondi --attach photo.jpg
//   civicecho resolve 42 --status resolved --solution "Fixed the pothole"
//   civicecho feedback 42 --rating 5 --comment "Resolved within a week"
// ============================================================================

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use civicecho_core::{
    authorize, can_submit_update, is_cancelable, is_feedback_eligible, AttachmentMeta,
    AttachmentUpload, Category, CitizenFilter, Complaint, ComplaintDraft, ComplaintStatus,
    DateWindow, Decision, FeedbackDraft, Identity, LoginIdentity, OfficialFilter, PortalClient,
    PortalConfig, PortalDb, Priority, RegistrationForm, RegistrationLocation, Role, Route,
    SessionManager, SortOrder,
};

/// CivicEcho complaint portal client
#[derive(Parser)]
#[command(name = "civicecho", version, about = "Command-line client for the CivicEcho complaint portal")]
struct Cli {
    /// Backend base URL (default: CIVICECHO_API_URL or http://localhost:8000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to the local store (default: CIVICECHO_DB_PATH or ~/.civicecho/portal.redb)
    #[arg(long, global = true)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        nid: String,
        #[arg(long)]
        password: String,
        /// citizen or official
        #[arg(long, default_value = "citizen")]
        role: String,
    },

    /// Clear the persisted session
    Logout,

    /// Show the active session
    Whoami,

    /// Create a citizen account
    Register {
        #[arg(long)]
        nid: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        contact: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Dhaka")]
        division: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        upazila: String,
    },

    /// Request a password-reset OTP
    RequestOtp {
        #[arg(long)]
        nid: String,
    },

    /// Verify a password-reset OTP
    VerifyOtp {
        #[arg(long)]
        nid: String,
        #[arg(long)]
        otp: String,
    },

    /// Set a new password after OTP verification
    ResetPassword {
        #[arg(long)]
        nid: String,
        #[arg(long)]
        new_password: String,
    },

    /// Your complaints (citizen) or your zone's queue (official)
    Dashboard {
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        /// Filter by status: pending, in-progress, on-hold, resolved, closed
        #[arg(long)]
        status: Option<String>,
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
        /// Filter by priority: high, medium, low (official view)
        #[arg(long)]
        priority: Option<String>,
        /// From date, YYYY-MM-DD (official view)
        #[arg(long)]
        from: Option<String>,
        /// To date inclusive, YYYY-MM-DD (official view)
        #[arg(long)]
        to: Option<String>,
        /// Relative date window: today, week, month, year (citizen view)
        #[arg(long)]
        window: Option<String>,
        /// Sort order: newest, oldest, title, status (citizen view)
        #[arg(long, default_value = "newest")]
        sort: String,
    },

    /// Submit a new complaint
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        upazila: String,
        /// Attachment file (repeatable; JPG, PNG, or PDF up to 5MB)
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },

    /// Show one complaint in full (official view)
    Show { id: i64 },

    /// Update a complaint's status; terminal states require a solution
    Resolve {
        id: i64,
        /// New status: pending, in-progress, on-hold, resolved, closed
        #[arg(long)]
        status: String,
        #[arg(long)]
        solution: Option<String>,
    },

    /// Cancel (permanently delete) one of your pending complaints
    Cancel { id: i64 },

    /// Rate a resolved complaint
    Feedback {
        id: i64,
        /// Stars, 1-5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },

    /// List your notifications
    Notifications,

    /// List complaint form vocabularies (categories, districts, upazilas)
    Options {
        /// District whose upazilas to fetch
        #[arg(long)]
        district: Option<String>,
    },
}

fn parse_role(s: &str) -> Result<Role> {
    match s.trim().to_lowercase().as_str() {
        "citizen" => Ok(Role::Citizen),
        "official" | "government official" | "government-official" => Ok(Role::GovernmentOfficial),
        _ => bail!("Unknown role '{}'. Valid values: citizen, official", s),
    }
}

fn parse_status(s: &str) -> Result<ComplaintStatus> {
    ComplaintStatus::parse(s).ok_or_else(|| {
        anyhow!(
            "Unknown status '{}'. Valid values: {}",
            s,
            ComplaintStatus::ALL
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn parse_category(s: &str) -> Result<Category> {
    Category::parse(s).ok_or_else(|| {
        anyhow!(
            "Unknown category '{}'. Valid values: {}",
            s,
            Category::ALL
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn parse_priority(s: &str) -> Result<Priority> {
    Priority::parse(s)
        .ok_or_else(|| anyhow!("Unknown priority '{}'. Valid values: High, Medium, Low", s))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

fn format_timestamp(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Run the route authorizer for a view and turn redirects into errors the
/// shell can see.
fn ensure_view(session: &SessionManager, route: Route) -> Result<()> {
    match authorize(session.identity(), route) {
        Decision::Render => Ok(()),
        Decision::RedirectToLogin => bail!(
            "Not authorized for {}; redirected to {}. Sign in with `civicecho login`.",
            route.path(),
            Route::Login.path()
        ),
        Decision::RedirectToRoleHome(home) => {
            bail!("Already signed in; redirected to {}.", home.path())
        }
    }
}

fn signed_in_for(session: &SessionManager, route: Route) -> Result<Identity> {
    ensure_view(session, route)?;
    session
        .identity()
        .cloned()
        .ok_or_else(|| anyhow!("No active session"))
}

/// The dashboard route for whoever is signed in; anonymous callers fail the
/// citizen guard and get the login redirect message.
fn dashboard_route(session: &SessionManager) -> Route {
    match session.identity() {
        Some(identity) if identity.role != Role::Citizen => Route::GovernmentDashboard,
        _ => Route::CitizensDashboard,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = PortalConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.db_path {
        config.db_path = Some(path);
    }

    let db = PortalDb::open(config.db_path.as_deref())?;
    let mut session = SessionManager::new(Box::new(db));
    session.restore();
    let client = PortalClient::new(&config.api_url);

    match cli.command {
        Commands::Login { nid, password, role } => {
            cmd_login(&client, &mut session, &nid, &password, &role).await
        }
        Commands::Logout => cmd_logout(&mut session),
        Commands::Whoami => cmd_whoami(&session),
        Commands::Register {
            nid,
            name,
            email,
            contact,
            password,
            division,
            district,
            upazila,
        } => {
            let form = RegistrationForm {
                nid,
                name,
                email,
                contact,
                password,
                role: Role::Citizen,
                location: RegistrationLocation {
                    division,
                    district,
                    upazila,
                },
            };
            cmd_register(&client, &session, form).await
        }
        Commands::RequestOtp { nid } => cmd_request_otp(&client, &nid).await,
        Commands::VerifyOtp { nid, otp } => cmd_verify_otp(&client, &nid, &otp).await,
        Commands::ResetPassword { nid, new_password } => {
            cmd_reset_password(&client, &nid, &new_password).await
        }
        Commands::Dashboard {
            search,
            status,
            category,
            priority,
            from,
            to,
            window,
            sort,
        } => {
            cmd_dashboard(
                &client, &session, search, status, category, priority, from, to, window, sort,
            )
            .await
        }
        Commands::Submit {
            title,
            description,
            category,
            district,
            upazila,
            attachments,
        } => {
            cmd_submit(
                &client,
                &session,
                title,
                description,
                &category,
                district,
                upazila,
                attachments,
            )
            .await
        }
        Commands::Show { id } => cmd_show(&client, &session, id).await,
        Commands::Resolve { id, status, solution } => {
            cmd_resolve(&client, &session, id, &status, solution).await
        }
        Commands::Cancel { id } => cmd_cancel(&client, &session, id).await,
        Commands::Feedback { id, rating, comment } => {
            cmd_feedback(&client, &session, id, rating, comment).await
        }
        Commands::Notifications => cmd_notifications(&client, &session).await,
        Commands::Options { district } => cmd_options(&client, &session, district).await,
    }
}

async fn cmd_login(
    client: &PortalClient,
    session: &mut SessionManager,
    nid: &str,
    password: &str,
    role: &str,
) -> Result<()> {
    ensure_view(session, Route::Login)?;
    let role = parse_role(role)?;

    let partial: LoginIdentity = client.login(nid, password, &role).await?;
    let home = session.login(partial);

    println!("Signed in as {} ({})", nid, role);
    println!("-> {}", home.path());
    Ok(())
}

fn cmd_logout(session: &mut SessionManager) -> Result<()> {
    let login = session.logout();
    println!("Signed out.");
    println!("-> {}", login.path());
    Ok(())
}

fn cmd_whoami(session: &SessionManager) -> Result<()> {
    match session.identity() {
        Some(identity) => {
            println!("NID:   {}", identity.nid);
            println!("Role:  {}", identity.role);
            if let Some(name) = &identity.name {
                println!("Name:  {}", name);
            }
            println!("Home:  {}", civicecho_core::home_route(Some(identity)).path());
        }
        None => {
            println!("Not signed in. Use `civicecho login`.");
        }
    }
    Ok(())
}

async fn cmd_register(
    client: &PortalClient,
    session: &SessionManager,
    form: RegistrationForm,
) -> Result<()> {
    ensure_view(session, Route::Register)?;
    client.register(&form).await?;
    println!("Account created for {}.", form.nid);
    println!("-> {}", Route::Login.path());
    Ok(())
}

async fn cmd_request_otp(client: &PortalClient, nid: &str) -> Result<()> {
    client.request_otp(nid).await?;
    println!("OTP sent. Verify it with `civicecho verify-otp`.");
    println!("-> {}", Route::VerifyOtp.path());
    Ok(())
}

async fn cmd_verify_otp(client: &PortalClient, nid: &str, otp: &str) -> Result<()> {
    client.verify_otp(nid, otp).await?;
    println!("OTP verified. Set a new password with `civicecho reset-password`.");
    println!("-> {}", Route::ResetPassword.path());
    Ok(())
}

async fn cmd_reset_password(client: &PortalClient, nid: &str, new_password: &str) -> Result<()> {
    client.reset_password(nid, new_password).await?;
    println!("Password updated. Sign in with `civicecho login`.");
    println!("-> {}", Route::Login.path());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_dashboard(
    client: &PortalClient,
    session: &SessionManager,
    search: Option<String>,
    status: Option<String>,
    category: Option<String>,
    priority: Option<String>,
    from: Option<String>,
    to: Option<String>,
    window: Option<String>,
    sort: String,
) -> Result<()> {
    let route = dashboard_route(session);
    let identity = signed_in_for(session, route)?;

    let status = status.as_deref().map(parse_status).transpose()?;
    let category = category.as_deref().map(parse_category).transpose()?;

    if identity.role == Role::Citizen {
        let window = window
            .as_deref()
            .map(|w| {
                DateWindow::parse(w)
                    .ok_or_else(|| anyhow!("Unknown window '{}'. Valid values: today, week, month, year", w))
            })
            .transpose()?;
        let sort = SortOrder::parse(&sort)
            .ok_or_else(|| anyhow!("Unknown sort '{}'. Valid values: newest, oldest, title, status", sort))?;

        let dashboard = client.citizen_dashboard(&identity.nid).await?;
        let filter = CitizenFilter {
            search,
            window,
            category,
            status,
            sort,
        };
        let complaints = filter.apply(&dashboard.complaints, chrono::Local::now().naive_local());

        println!("=== Citizen Dashboard ===");
        if let Some(name) = &dashboard.profile.name {
            println!("Signed in: {} ({})", name, identity.nid);
        }
        if let Some(total) = dashboard.profile.total_complaints {
            println!("Total complaints filed: {}", total);
        }
        println!();
        print_citizen_complaints(&complaints);
    } else {
        let from = from.as_deref().map(parse_date).transpose()?;
        let to = to.as_deref().map(parse_date).transpose()?;
        let priority = priority.as_deref().map(parse_priority).transpose()?;

        let dashboard = client.government_dashboard(&identity.nid).await?;
        let filter = OfficialFilter {
            search,
            from,
            to,
            category,
            status,
            priority,
        };
        let complaints = filter.apply(&dashboard.complaints);

        println!("=== Government Dashboard ===");
        if let Some(name) = &dashboard.official_info.name {
            println!("Official: {}", name);
        }
        if let Some(zone) = &dashboard.official_info.zone {
            println!("Zone:     {}", zone);
        }
        if !dashboard.notifications.is_empty() {
            println!("Unread notifications: {}", dashboard.notifications.len());
        }
        println!();
        print_official_complaints(&complaints);
    }

    Ok(())
}

fn print_citizen_complaints(complaints: &[Complaint]) {
    if complaints.is_empty() {
        println!("No complaints found.");
        return;
    }

    println!(
        "{:<6}  {:<12}  {:<28}  {:<17}  {}",
        "ID", "STATUS", "CATEGORY", "FILED", "TITLE"
    );
    println!("{}", "-".repeat(90));
    for complaint in complaints {
        println!(
            "{:<6}  {:<12}  {:<28}  {:<17}  {}",
            complaint.id,
            complaint.status.as_str(),
            complaint.category.as_str(),
            format_timestamp(complaint.created_at),
            complaint.title
        );
    }
    println!("\nTotal: {} complaints", complaints.len());
}

fn print_official_complaints(complaints: &[Complaint]) {
    if complaints.is_empty() {
        println!("No unresolved complaints found.");
        return;
    }

    println!(
        "{:<6}  {:<12}  {:<8}  {:<28}  {:<16}  {}",
        "ID", "STATUS", "PRIORITY", "CATEGORY", "CITIZEN", "LOCATION"
    );
    println!("{}", "-".repeat(100));
    for complaint in complaints {
        println!(
            "{:<6}  {:<12}  {:<8}  {:<28}  {:<16}  {}",
            complaint.id,
            complaint.status.as_str(),
            complaint.priority.map(|p| p.as_str()).unwrap_or("-"),
            complaint.category.as_str(),
            complaint.citizen_name.as_deref().unwrap_or("-"),
            complaint.location.as_deref().unwrap_or("-")
        );
    }
    println!("\nShowing {} unresolved complaints", complaints.len());
}

#[allow(clippy::too_many_arguments)]
async fn cmd_submit(
    client: &PortalClient,
    session: &SessionManager,
    title: String,
    description: String,
    category: &str,
    district: String,
    upazila: String,
    attachments: Vec<PathBuf>,
) -> Result<()> {
    let identity = signed_in_for(session, Route::Complaint)?;
    let category = parse_category(category)?;

    let mut metas = Vec::new();
    for path in &attachments {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Invalid attachment path: {}", path.display()))?;
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| anyhow!("Cannot read attachment {}: {}", path.display(), e))?
            .len();
        metas.push(AttachmentMeta {
            file_name,
            size_bytes,
        });
    }

    let draft = ComplaintDraft {
        title,
        description,
        category: Some(category),
        district,
        upazila,
        attachments: metas.clone(),
    };

    let violations = draft.validate();
    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  - {}", violation);
        }
        bail!("Complaint not submitted: {} validation error(s)", violations.len());
    }

    let mut uploads = Vec::new();
    for (path, meta) in attachments.iter().zip(metas) {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow!("Cannot read attachment {}: {}", path.display(), e))?;
        uploads.push(AttachmentUpload {
            file_name: meta.file_name,
            bytes,
        });
    }

    let receipt = client.submit_complaint(&identity.nid, &draft, uploads).await?;
    println!(
        "Complaint submitted. ID: {} ({} file(s) uploaded)",
        receipt.complaint_id,
        receipt.uploaded_files.len()
    );
    println!("-> {}", Route::CitizensDashboard.path());
    Ok(())
}

async fn cmd_show(client: &PortalClient, session: &SessionManager, id: i64) -> Result<()> {
    let identity = signed_in_for(session, Route::Solution)?;
    let complaint = client.complaint_details(&identity.nid, id).await?;

    println!("=== Complaint #{} ===", complaint.id);
    if let Some(citizen) = &complaint.citizen_name {
        println!("Citizen:   {}", citizen);
    }
    println!("Category:  {}", complaint.category);
    if let Some(location) = &complaint.location {
        println!("Location:  {}", location);
    }
    if let Some(zone) = &complaint.zone {
        println!("Zone:      {}", zone);
    }
    println!("Status:    {}", complaint.status);
    println!("Filed:     {}", format_timestamp(complaint.created_at));
    if !complaint.description.is_empty() {
        println!("\n{}", complaint.description);
    }
    if let Some(solution) = &complaint.solution {
        println!("\nSolution:  {}", solution);
    }
    if let Some(feedback) = &complaint.feedback {
        println!("Feedback:  {}", feedback);
    }
    if let Some(rating) = complaint.rating {
        println!("Rating:    {} / 5", rating);
    }
    if complaint.attachments.is_empty() {
        println!("\nNo attachments.");
    } else {
        println!("\nAttachments:");
        for (i, attachment) in complaint.attachments.iter().enumerate() {
            println!("  {}. {}/{}", i + 1, client.base_url(), attachment);
        }
    }
    Ok(())
}

async fn cmd_resolve(
    client: &PortalClient,
    session: &SessionManager,
    id: i64,
    status: &str,
    solution: Option<String>,
) -> Result<()> {
    let identity = signed_in_for(session, Route::Solution)?;
    let status = parse_status(status)?;
    let solution_text = solution.as_deref().unwrap_or("");

    if !can_submit_update(Some(status), solution_text) {
        bail!("A solution is required when marking a complaint as Resolved or Closed.");
    }

    client
        .submit_solution(&identity.nid, id, status, solution.as_deref())
        .await?;
    println!("Complaint #{} updated to {}.", id, status);
    Ok(())
}

async fn cmd_cancel(client: &PortalClient, session: &SessionManager, id: i64) -> Result<()> {
    let identity = signed_in_for(session, Route::CitizensDashboard)?;

    let dashboard = client.citizen_dashboard(&identity.nid).await?;
    let complaint = dashboard
        .complaints
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| anyhow!("Complaint #{} not found in your dashboard", id))?;

    if !is_cancelable(complaint, &identity.nid) {
        bail!(
            "Only your own pending complaints can be cancelled (complaint #{} is {}).",
            id,
            complaint.status
        );
    }

    client.cancel_complaint(&identity.nid, id).await?;
    println!("Complaint #{} cancelled and removed.", id);
    Ok(())
}

async fn cmd_feedback(
    client: &PortalClient,
    session: &SessionManager,
    id: i64,
    rating: u8,
    comment: String,
) -> Result<()> {
    let identity = signed_in_for(session, Route::Feedback)?;

    let dashboard = client.citizen_dashboard(&identity.nid).await?;
    let complaint = dashboard
        .complaints
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| anyhow!("Complaint #{} not found in your dashboard", id))?;

    if !is_feedback_eligible(complaint) {
        bail!(
            "Feedback opens once a complaint is Resolved or Closed (complaint #{} is {}).",
            id,
            complaint.status
        );
    }

    let draft = FeedbackDraft {
        rating,
        feedback: comment,
    };
    let violations = draft.validate();
    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  - {}", violation);
        }
        bail!("Feedback not submitted: {} validation error(s)", violations.len());
    }

    client
        .submit_feedback(&identity.nid, id, draft.rating, &draft.feedback)
        .await?;
    println!("Thank you for your {}-star feedback!", draft.rating);
    Ok(())
}

async fn cmd_notifications(client: &PortalClient, session: &SessionManager) -> Result<()> {
    let route = dashboard_route(session);
    let identity = signed_in_for(session, route)?;

    let notifications = client.notifications(&identity.nid).await?;
    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    for notification in &notifications {
        let kind = notification.kind.as_deref().unwrap_or("update");
        println!("[{}] #{} {}", kind, notification.id, notification.message);
    }
    println!("\nTotal: {} notifications", notifications.len());
    Ok(())
}

async fn cmd_options(
    client: &PortalClient,
    session: &SessionManager,
    district: Option<String>,
) -> Result<()> {
    signed_in_for(session, Route::Complaint)?;
    let options = client.location_options(district.as_deref()).await?;

    match district {
        Some(district) => {
            println!("Upazilas in {}:", district);
            for upazila in &options.upazilas {
                println!("  - {}", upazila);
            }
        }
        None => {
            println!("Categories:");
            for category in &options.categories {
                println!("  - {}", category);
            }
            println!("\nDistricts:");
            for district in &options.districts {
                println!("  - {}", district);
            }
        }
    }
    Ok(())
}
