use uuid::Uuid;

use super::expense::Expense;

/// In-memory owner of the expense collection.
///
/// The book is the single state container the presentation layer holds; pure
/// query functions borrow its records, mutations go through the services, and
/// the whole collection is mirrored to storage after every change.
#[derive(Debug, Clone, Default)]
pub struct BillBook {
    pub expenses: Vec<Expense>,
}

impl BillBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_expenses(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    pub fn add_expense(&mut self, expense: Expense) -> Uuid {
        let id = expense.id;
        self.expenses.push(expense);
        id
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn expense_mut(&mut self, id: Uuid) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|expense| expense.id == id)
    }

    pub fn remove_expense(&mut self, id: Uuid) -> Option<Expense> {
        let index = self.expenses.iter().position(|expense| expense.id == id)?;
        Some(self.expenses.remove(index))
    }

    pub fn expense_count(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}
