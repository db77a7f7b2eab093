//! Command-line interface definitions.
//!
//! One subcommand per dashboard action: viewing and editing the profile,
//! and managing the listings the signed-in user owns.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DraftChange, ProfileField};

/// Manage your bike listings and profile from the terminal
#[derive(Parser, Debug)]
#[command(name = "bikeyard")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "bikeyard.toml")]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View or edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// List the bikes you have listed
    Listings,

    /// Show the buyers interested in one of your listings
    Buyers(ListingArg),

    /// Flip a listing between sold and available
    ToggleSold(ListingArg),

    /// Delete a listing
    Delete(DeleteArgs),

    /// Remove an interested buyer from a listing
    RemoveBuyer(RemoveBuyerArgs),

    /// Edit listing details
    Edit(EditArgs),
}

/// Subcommands for `bikeyard profile`.
#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show your profile
    Show,
    /// Update profile fields and save
    Set(ProfileSetArgs),
}

#[derive(Args, Debug)]
pub struct ProfileSetArgs {
    /// Assignments such as `phone=9800000000` or `location=Pune`
    #[arg(required = true, value_name = "FIELD=VALUE")]
    pub assignments: Vec<ProfileAssignment>,
}

#[derive(Args, Debug)]
pub struct ListingArg {
    /// Listing id
    pub listing_id: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Listing id
    pub listing_id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct RemoveBuyerArgs {
    /// Listing id
    pub listing_id: String,

    /// User id of the buyer to remove
    pub buyer_id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Listing id
    pub listing_id: String,

    /// Field changes such as `price=42000` or `kilometresRun=18000`
    #[arg(required = true, value_name = "FIELD=VALUE")]
    pub changes: Vec<DraftChange>,
}

/// `field=value` for a profile field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileAssignment {
    pub field: ProfileField,
    pub value: String,
}

impl FromStr for ProfileAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{s}'"))?;
        Ok(Self {
            field: name.parse()?,
            value: value.to_string(),
        })
    }
}
