//! Shell context, command dispatch, and command handlers.

use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    bills::{DueStatus, MonthKey},
    cli::{
        io, output,
        system_clock::SystemClock,
        ui::{format_amount, format_date, format_percent, Alignment, Table, TableColumn},
    },
    config::{Config, ConfigManager},
    core::{
        services::{ExpenseDraft, ExpenseService, ServiceError, SummaryService},
        BookManager, Clock,
    },
    errors::BillError,
    storage::JsonStorage,
};

const CHART_WIDTH: usize = 30;
const SUGGESTION_DISTANCE: usize = 3;

const COMMANDS: &[(&str, &str, &str)] = &[
    ("help", "help", "Show available commands"),
    ("list", "list", "List bills for the current month in due order"),
    ("add", "add <name> <amount> <due-day> [category]", "Record a new bill"),
    (
        "edit",
        "edit <name> <amount> <due-day> [category]",
        "Update a bill, keeping its payment history",
    ),
    ("remove", "remove <name>", "Delete a bill"),
    ("pay", "pay <name>", "Toggle the current month's paid state"),
    ("summary", "summary", "Totals for the current month"),
    ("chart", "chart [paid]", "Category breakdown for the current month"),
    ("categories", "categories", "Show category suggestions"),
    ("backup", "backup [note]", "Snapshot the expense blob"),
    ("backups", "backups", "List available backups"),
    ("restore", "restore <backup-id>", "Replace the blob with a backup"),
    ("exit", "exit", "Leave the shell"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Fatal shell errors that abort the CLI loop.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BillError),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-command failures reported to the user without leaving the loop.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Core(#[from] BillError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

pub struct ShellContext {
    pub running: bool,
    mode: CliMode,
    manager: BookManager,
    config: Config,
    clock: Box<dyn Clock>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let storage = JsonStorage::new(None, None)?;
        let mut manager = BookManager::new(Box::new(storage));
        let metadata = manager.load()?;
        for warning in &metadata.warnings {
            output::warning(warning);
        }
        if mode == CliMode::Interactive {
            output::info(format!(
                "Loaded {} bills from {}.",
                metadata.loaded,
                metadata.path.display()
            ));
        }
        let config = ConfigManager::new()?.load()?;
        Ok(Self {
            running: true,
            mode,
            manager,
            config,
            clock: Box::new(SystemClock),
        })
    }

    pub fn command_names() -> Vec<&'static str> {
        COMMANDS.iter().map(|(name, _, _)| *name).collect()
    }

    pub fn report_error(&self, err: CommandError) {
        output::error(err);
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<LoopControl, CommandError> {
        match command {
            "help" => self.cmd_help(),
            "list" => self.cmd_list(),
            "add" => self.cmd_add(args),
            "edit" => self.cmd_edit(args),
            "remove" => self.cmd_remove(args),
            "pay" => self.cmd_pay(args),
            "summary" => self.cmd_summary(),
            "chart" => self.cmd_chart(args),
            "categories" => self.cmd_categories(),
            "backup" => self.cmd_backup(args),
            "backups" => self.cmd_backups(),
            "restore" => self.cmd_restore(args),
            "exit" | "quit" => return Ok(LoopControl::Exit),
            unknown => return Err(self.unknown_command(unknown)),
        }?;
        Ok(LoopControl::Continue)
    }

    fn unknown_command(&self, raw: &str) -> CommandError {
        let suggestion = COMMANDS
            .iter()
            .map(|(name, _, _)| (*name, levenshtein(raw, name)))
            .min_by_key(|(_, distance)| *distance)
            .filter(|(_, distance)| *distance <= SUGGESTION_DISTANCE)
            .map(|(name, _)| name);
        match suggestion {
            Some(name) => {
                CommandError::Input(format!("unknown command `{raw}`, did you mean `{name}`?"))
            }
            None => CommandError::Input(format!("unknown command `{raw}`, type `help` to list commands")),
        }
    }

    fn cmd_help(&self) -> Result<(), CommandError> {
        output::section("Commands");
        let mut table = Table::new(vec![
            TableColumn::new("Usage", Alignment::Left),
            TableColumn::new("Description", Alignment::Left),
        ]);
        for (_, usage, description) in COMMANDS {
            table.push_row(vec![usage.to_string(), description.to_string()]);
        }
        for line in table.render() {
            println!("{line}");
        }
        Ok(())
    }

    fn cmd_list(&self) -> Result<(), CommandError> {
        let today = self.clock.today();
        let schedule = SummaryService::due_schedule(self.manager.book(), today);
        if schedule.is_empty() {
            output::info("No bills recorded yet.");
            return Ok(());
        }
        output::section(format!("Bills for {}", MonthKey::from_date(today)));
        let mut table = Table::new(vec![
            TableColumn::new("Name", Alignment::Left),
            TableColumn::new("Category", Alignment::Left),
            TableColumn::new("Amount", Alignment::Right),
            TableColumn::new("Due", Alignment::Left),
            TableColumn::new("Days", Alignment::Right),
            TableColumn::new("Status", Alignment::Left),
            TableColumn::new("Paid", Alignment::Left),
        ]);
        for entry in schedule {
            table.push_row(vec![
                entry.expense.name.clone(),
                entry.expense.category.clone(),
                format_amount(entry.expense.amount, &self.config.currency),
                format_date(entry.due_date),
                entry.days_until_due.to_string(),
                due_status_label(entry.status).to_string(),
                if entry.paid { "yes".into() } else { String::new() },
            ]);
        }
        for line in table.render() {
            println!("{line}");
        }
        Ok(())
    }

    fn cmd_add(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let draft = parse_expense_args("add", args)?;
        let name = draft.name.clone();
        ExpenseService::add(self.manager.book_mut(), draft)?;
        self.persist()?;
        output::success(format!("Recorded bill `{name}`."));
        Ok(())
    }

    fn cmd_edit(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let draft = parse_expense_args("edit", args)?;
        let id = self.find_expense(&draft.name)?;
        let name = draft.name.clone();
        ExpenseService::update(self.manager.book_mut(), id, draft)?;
        self.persist()?;
        output::success(format!("Updated bill `{name}`."));
        Ok(())
    }

    fn cmd_remove(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let name = single_name_arg("remove", args)?;
        let id = self.find_expense(name)?;
        if !self.confirm(&format!("Delete bill `{name}`?"))? {
            output::info("Aborted.");
            return Ok(());
        }
        let removed = ExpenseService::remove(self.manager.book_mut(), id)?;
        self.persist()?;
        output::success(format!("Removed bill `{}`.", removed.name));
        Ok(())
    }

    fn cmd_pay(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let name = single_name_arg("pay", args)?;
        let id = self.find_expense(name)?;
        let month = MonthKey::from_date(self.clock.today());
        let paid =
            ExpenseService::toggle_paid(self.manager.book_mut(), id, month, self.clock.now())?;
        self.persist()?;
        if paid {
            output::success(format!("Marked `{name}` paid for {month}."));
        } else {
            output::success(format!("Marked `{name}` unpaid for {month}."));
        }
        Ok(())
    }

    fn cmd_summary(&self) -> Result<(), CommandError> {
        let summary = SummaryService::month_summary(self.manager.book(), self.clock.today());
        let currency = &self.config.currency;
        output::section(format!("Summary for {}", summary.month));
        println!("Total:  {}", format_amount(summary.total_all, currency));
        println!(
            "Paid:   {} ({} bills)",
            format_amount(summary.total_paid, currency),
            summary.paid_count
        );
        println!(
            "Unpaid: {} ({} bills)",
            format_amount(summary.total_unpaid, currency),
            summary.unpaid_count
        );
        Ok(())
    }

    fn cmd_chart(&self, args: &[&str]) -> Result<(), CommandError> {
        let paid_only = match args {
            &[] => false,
            &["paid"] => true,
            _ => {
                return Err(CommandError::Input("usage: chart [paid]".into()));
            }
        };
        let today = self.clock.today();
        let shares = SummaryService::category_breakdown(self.manager.book(), today, paid_only);
        if shares.is_empty() {
            output::info("Nothing to chart yet.");
            return Ok(());
        }
        let title = if paid_only { "paid" } else { "all" };
        output::section(format!(
            "Categories ({title}) for {}",
            MonthKey::from_date(today)
        ));
        let name_width = shares
            .iter()
            .map(|share| share.category.chars().count())
            .max()
            .unwrap_or(0);
        for share in shares {
            let bar_len = (share.percent / 100.0 * CHART_WIDTH as f64).round() as usize;
            println!(
                "{:<name_width$}  {:>12}  {:>6}  {}",
                share.category,
                format_amount(share.total, &self.config.currency),
                format_percent(share.percent),
                "#".repeat(bar_len),
                name_width = name_width,
            );
        }
        Ok(())
    }

    fn cmd_categories(&self) -> Result<(), CommandError> {
        output::info(format!(
            "Category suggestions: {}",
            self.config.category_suggestions.join(", ")
        ));
        Ok(())
    }

    fn cmd_backup(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let note = args.join(" ");
        let note = if note.trim().is_empty() {
            None
        } else {
            Some(note)
        };
        let info = self.manager.backup(note.as_deref())?;
        output::success(format!("Backup `{}` created.", info.id));
        Ok(())
    }

    fn cmd_backups(&self) -> Result<(), CommandError> {
        let backups = self.manager.list_backups()?;
        if backups.is_empty() {
            output::info("No backups yet.");
            return Ok(());
        }
        let mut table = Table::new(vec![
            TableColumn::new("Backup", Alignment::Left),
            TableColumn::new("Created", Alignment::Left),
        ]);
        for backup in backups {
            let created = backup
                .created_at
                .map(|stamp| stamp.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".into());
            table.push_row(vec![backup.id, created]);
        }
        for line in table.render() {
            println!("{line}");
        }
        Ok(())
    }

    fn cmd_restore(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let [backup_id] = args else {
            return Err(CommandError::Input("usage: restore <backup-id>".into()));
        };
        if !self.confirm(&format!("Replace current bills with backup `{backup_id}`?"))? {
            output::info("Aborted.");
            return Ok(());
        }
        let metadata = self.manager.restore(backup_id)?;
        for warning in &metadata.warnings {
            output::warning(warning);
        }
        output::success(format!(
            "Restored {} bills from `{backup_id}`.",
            metadata.loaded
        ));
        Ok(())
    }

    fn persist(&self) -> Result<(), CommandError> {
        self.manager.save()?;
        Ok(())
    }

    fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        match self.mode {
            CliMode::Script => Ok(true),
            CliMode::Interactive => io::confirm_action(prompt, false),
        }
    }

    /// Resolves a bill by case-insensitive name.
    fn find_expense(&self, name: &str) -> Result<Uuid, CommandError> {
        let matches: Vec<Uuid> = self
            .manager
            .book()
            .expenses
            .iter()
            .filter(|expense| expense.name.eq_ignore_ascii_case(name))
            .map(|expense| expense.id)
            .collect();
        match matches.as_slice() {
            [] => Err(CommandError::Input(format!("no bill named `{name}`"))),
            [id] => Ok(*id),
            _ => Err(CommandError::Input(format!(
                "multiple bills named `{name}`, rename one first"
            ))),
        }
    }
}

fn due_status_label(status: DueStatus) -> &'static str {
    match status {
        DueStatus::Overdue => "overdue",
        DueStatus::DueSoon => "due soon",
        DueStatus::Upcoming => "upcoming",
    }
}

fn single_name_arg<'a>(command: &str, args: &[&'a str]) -> Result<&'a str, CommandError> {
    match args {
        &[name] => Ok(name),
        _ => Err(CommandError::Input(format!("usage: {command} <name>"))),
    }
}

fn parse_expense_args(command: &str, args: &[&str]) -> Result<ExpenseDraft, CommandError> {
    let [name, amount, due_day, category @ ..] = args else {
        return Err(CommandError::Input(format!(
            "usage: {command} <name> <amount> <due-day> [category]"
        )));
    };
    let amount: f64 = amount
        .parse()
        .map_err(|_| CommandError::Input(format!("amount `{amount}` is not a number")))?;
    let due_day: u32 = due_day
        .parse()
        .map_err(|_| CommandError::Input(format!("due day `{due_day}` is not a number")))?;
    Ok(ExpenseDraft {
        name: (*name).to_string(),
        category: category.join(" "),
        amount,
        due_day,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expense_args_with_multi_word_category() {
        let draft =
            parse_expense_args("add", &["Car Insurance", "89.50", "14", "Car", "Costs"]).unwrap();
        assert_eq!(draft.name, "Car Insurance");
        assert_eq!(draft.amount, 89.5);
        assert_eq!(draft.due_day, 14);
        assert_eq!(draft.category, "Car Costs");
    }

    #[test]
    fn rejects_short_or_non_numeric_args() {
        assert!(parse_expense_args("add", &["Rent"]).is_err());
        assert!(parse_expense_args("add", &["Rent", "abc", "1"]).is_err());
        assert!(parse_expense_args("add", &["Rent", "10", "first"]).is_err());
    }

    #[test]
    fn command_names_cover_the_registry() {
        let names = ShellContext::command_names();
        assert!(names.contains(&"add"));
        assert!(names.contains(&"restore"));
    }
}
