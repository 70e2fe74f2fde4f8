//! Command structs

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum LedgerCommands {
    #[command(description = "cara guna")]
    Start,
    #[command(description = "cara guna")]
    Help,
    #[command(description = "hari ini")]
    Today,
    #[command(description = "7 hari")]
    Week,
    #[command(description = "30 hari")]
    Month,
    #[command(description = "ikut kategori")]
    Summary,
    #[command(description = "delete last")]
    Undo,
    #[command(description = "download CSV")]
    Export,
}
