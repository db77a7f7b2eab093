//! Command dispatch.
//!
//! Each handler builds a dashboard for the environment session, drives the
//! same store operations a view would, and prints the resulting banner.

use std::sync::Arc;

use indicatif::ProgressBar;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::{
    Commands, DeleteArgs, EditArgs, ListingArg, ProfileCommand, ProfileSetArgs, RemoveBuyerArgs,
};
use super::confirm::DialoguerConfirmer;
use super::output;
use crate::adapter::outbound::session::{StaticSession, USER_ID_VAR};
use crate::application::{Dashboard, Outcome};
use crate::domain::{Listing, ListingId, Notice, ProfileField, Tab, UserId};
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::build_dashboard;
use crate::infrastructure::config::Config;
use crate::port::{AssumeYes, Confirmer, SessionContext};

#[derive(Tabled)]
struct ListingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Bike")]
    title: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Year")]
    year: u16,
    #[tabled(rename = "Km")]
    kilometres: u64,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Buyers")]
    buyers: usize,
}

impl From<&Listing> for ListingRow {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.to_string(),
            title: listing.title(),
            price: listing.price.to_string(),
            year: listing.model_year,
            kilometres: listing.kilometres_run,
            status: if listing.sold { "sold" } else { "available" },
            buyers: listing.booked_buyers.len(),
        }
    }
}

#[derive(Tabled)]
struct BuyerRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "User ID")]
    user_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Location")]
    location: String,
}

/// Run `command` as the session described by the environment.
pub async fn execute(command: &Commands, config: &Config) -> Result<()> {
    let session: Arc<dyn SessionContext> = Arc::new(StaticSession::from_env());
    execute_with_session(command, config, session).await
}

/// Run `command` as `session`.
pub async fn execute_with_session(
    command: &Commands,
    config: &Config,
    session: Arc<dyn SessionContext>,
) -> Result<()> {
    match command {
        Commands::Profile(ProfileCommand::Show) => {
            profile_show(&open(config, session, false)?).await
        }
        Commands::Profile(ProfileCommand::Set(args)) => {
            profile_set(&open(config, session, false)?, args).await
        }
        Commands::Listings => listings(&open(config, session, false)?).await,
        Commands::Buyers(args) => buyers(&open(config, session, false)?, args).await,
        Commands::ToggleSold(args) => toggle_sold(&open(config, session, false)?, args).await,
        Commands::Delete(args) => delete(&open(config, session, args.yes)?, args).await,
        Commands::RemoveBuyer(args) => {
            remove_buyer(&open(config, session, args.yes)?, args).await
        }
        Commands::Edit(args) => edit(&open(config, session, false)?, args).await,
    }
}

#[allow(clippy::result_large_err)]
fn open(config: &Config, session: Arc<dyn SessionContext>, assume_yes: bool) -> Result<Dashboard> {
    let confirmer: Arc<dyn Confirmer> = if assume_yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(DialoguerConfirmer)
    };
    build_dashboard(config, session, confirmer)
}

async fn profile_show(dashboard: &Dashboard) -> Result<()> {
    let pb = output::spinner("Loading profile");
    let profile = match dashboard.profile.load().await {
        Ok(profile) => {
            output::spinner_success(&pb, "Profile loaded");
            profile
        }
        Err(err) => {
            fail(&pb, dashboard.profile.notice(), &err);
            return Err(err);
        }
    };
    let role = dashboard.profile.role_label();

    if output::is_json() {
        output::json_output(json!({
            "command": "profile.show",
            "profile": profile,
            "role": role,
        }));
        return Ok(());
    }

    output::section(&format!(
        "{} {}",
        output::highlight(dashboard.profile.avatar_initial()),
        profile.username
    ));
    output::field("role", role);
    for field in ProfileField::ALL {
        output::field(field.as_str(), or_not_set(profile.get(field)));
    }
    Ok(())
}

async fn profile_set(dashboard: &Dashboard, args: &ProfileSetArgs) -> Result<()> {
    let pb = output::spinner("Loading profile");
    if let Err(err) = dashboard.profile.load().await {
        // Saving over a profile that never loaded would blank every field.
        fail(&pb, dashboard.profile.notice(), &err);
        return Err(err);
    }
    pb.finish_and_clear();

    for assignment in &args.assignments {
        dashboard
            .profile
            .change_field(assignment.field, assignment.value.clone());
    }
    if dashboard.profile.profile().username.trim().is_empty() {
        return Err(Error::InvalidInput("username is required".into()));
    }

    let pb = output::spinner("Saving profile");
    match dashboard.profile.save().await {
        Ok(_) => {
            finish(&pb, dashboard.profile.notice());
            output::json_output(json!({
                "command": "profile.set",
                "profile": dashboard.profile.profile(),
            }));
            Ok(())
        }
        Err(err) => {
            fail(&pb, dashboard.profile.notice(), &err);
            Err(err)
        }
    }
}

async fn listings(dashboard: &Dashboard) -> Result<()> {
    enter(dashboard, Tab::Listings).await?;
    let listings = dashboard.listings.listings();

    if output::is_json() {
        output::json_output(json!({
            "command": "listings",
            "listings": listings,
        }));
        return Ok(());
    }

    output::section("Your listings");
    if listings.is_empty() {
        output::note("You have not listed any bikes yet.");
        return Ok(());
    }
    let rows: Vec<ListingRow> = listings.iter().map(ListingRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    output::hint(&format!(
        "run {} to see who is interested",
        output::highlight("bikeyard buyers <id>")
    ));
    Ok(())
}

async fn buyers(dashboard: &Dashboard, args: &ListingArg) -> Result<()> {
    enter(dashboard, Tab::Customers).await?;
    let id = ListingId::new(args.listing_id.as_str());
    let roster = dashboard
        .listings
        .roster(&id)
        .ok_or_else(|| Error::ListingNotFound(id.to_string()))?;

    if output::is_json() {
        let buyers: Vec<_> = roster.entries().iter().map(|entry| &entry.buyer).collect();
        output::json_output(json!({
            "command": "buyers",
            "listingId": roster.listing_id(),
            "title": roster.title(),
            "sold": roster.is_sold(),
            "buyers": buyers,
        }));
        return Ok(());
    }

    let status = if roster.is_sold() {
        output::muted("sold")
    } else {
        output::positive("available")
    };
    output::section(&format!("{} ({status})", roster.title()));
    if let Some(message) = roster.empty_message() {
        output::note(message);
        return Ok(());
    }

    let rows: Vec<BuyerRow> = roster
        .entries()
        .iter()
        .map(|entry| BuyerRow {
            index: entry.index,
            user_id: entry.buyer.user_id.to_string(),
            name: entry.buyer.username.clone(),
            contact: entry.buyer.contact.clone(),
            location: entry.buyer.location.clone(),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    output::hint(&format!(
        "run {} to remove one",
        output::highlight(format!("bikeyard remove-buyer {id} <user-id>"))
    ));
    Ok(())
}

async fn toggle_sold(dashboard: &Dashboard, args: &ListingArg) -> Result<()> {
    enter(dashboard, Tab::Listings).await?;
    let id = ListingId::new(args.listing_id.as_str());

    let pb = output::spinner("Updating status");
    match dashboard.listings.toggle_sold(&id).await {
        Ok(listing) => {
            finish(&pb, dashboard.listings.notice());
            print_listing("toggle-sold", &listing);
            Ok(())
        }
        Err(err) => {
            fail(&pb, dashboard.listings.notice(), &err);
            Err(err)
        }
    }
}

async fn delete(dashboard: &Dashboard, args: &DeleteArgs) -> Result<()> {
    enter(dashboard, Tab::Listings).await?;
    let id = ListingId::new(args.listing_id.as_str());

    match dashboard.listings.delete(&id).await {
        Ok(Outcome::Applied(deleted)) => {
            report(dashboard.listings.notice());
            output::json_output(json!({ "command": "delete", "deleted": deleted }));
            Ok(())
        }
        Ok(Outcome::Declined) => {
            output::warning("Cancelled, nothing was deleted.");
            Ok(())
        }
        Err(err) => {
            report(dashboard.listings.notice());
            Err(err)
        }
    }
}

async fn remove_buyer(dashboard: &Dashboard, args: &RemoveBuyerArgs) -> Result<()> {
    enter(dashboard, Tab::Customers).await?;
    let id = ListingId::new(args.listing_id.as_str());
    let buyer = UserId::new(args.buyer_id.as_str());

    match dashboard.listings.remove_buyer(&id, &buyer).await {
        Ok(Outcome::Applied(listing)) => {
            report(dashboard.listings.notice());
            print_listing("remove-buyer", &listing);
            Ok(())
        }
        Ok(Outcome::Declined) => {
            output::warning("Cancelled, the buyer was kept.");
            Ok(())
        }
        Err(err) => {
            report(dashboard.listings.notice());
            Err(err)
        }
    }
}

async fn edit(dashboard: &Dashboard, args: &EditArgs) -> Result<()> {
    enter(dashboard, Tab::Listings).await?;
    let id = ListingId::new(args.listing_id.as_str());
    let listing = dashboard
        .listings
        .get(&id)
        .ok_or_else(|| Error::ListingNotFound(id.to_string()))?;

    dashboard.editor.open(&listing);
    for change in &args.changes {
        dashboard.editor.change_field(change.clone())?;
    }

    let pb = output::spinner("Saving changes");
    match dashboard.editor.submit().await {
        Ok(updated) => {
            let message = dashboard.editor.message().unwrap_or_default();
            output::spinner_success(&pb, &message);
            print_listing("edit", &updated);
            Ok(())
        }
        Err(err) => {
            let message = dashboard
                .editor
                .error()
                .unwrap_or_else(|| err.to_string());
            output::spinner_fail(&pb, &message);
            Err(err)
        }
    }
}

/// Select a listing tab, which loads the collection on first entry.
async fn enter(dashboard: &Dashboard, tab: Tab) -> Result<()> {
    if dashboard.listings.owner().is_none() {
        return Err(Error::InvalidInput(format!(
            "{USER_ID_VAR} is not set, so your listings cannot be found"
        )));
    }

    let pb = output::spinner("Loading your listings");
    match dashboard.tabs.select(tab).await {
        Ok(()) => {
            let count = dashboard.listings.len();
            output::spinner_success(&pb, &format!("Loaded {count} listing(s)"));
            Ok(())
        }
        Err(err) => {
            fail(&pb, dashboard.listings.notice(), &err);
            Err(err)
        }
    }
}

fn print_listing(command: &str, listing: &Listing) {
    output::json_output(json!({ "command": command, "listing": listing }));
}

fn finish(pb: &ProgressBar, notice: Option<Notice>) {
    let text = notice.map_or_else(|| "Done".to_string(), |notice| notice.text);
    output::spinner_success(pb, &text);
}

fn fail(pb: &ProgressBar, notice: Option<Notice>, err: &Error) {
    let text = notice.map_or_else(|| err.to_string(), |notice| notice.text);
    output::spinner_fail(pb, &text);
}

fn report(notice: Option<Notice>) {
    match notice {
        Some(notice) if notice.kind.is_failure() => output::error(&notice.text),
        Some(notice) => output::success(&notice.text),
        None => {}
    }
}

fn or_not_set(value: &str) -> String {
    if value.trim().is_empty() {
        output::muted("not set")
    } else {
        value.to_string()
    }
}
