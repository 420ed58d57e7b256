// Entity access layer
//
// Each entity module has:
// - the stored record and the input accepted on create/update
// - list / get / create / update / delete / search over an explicit &Connection
// - raw id-preserving insert and full-table read for bulk transfer

pub mod expense;
pub mod payment;
pub mod resident;

pub use expense::{
    create_expense, delete_expense, get_expense, list_expenses, search_expenses, update_expense,
    Expense, ExpenseInput,
};
pub use payment::{
    create_payment, delete_payment, get_payment, list_payments, search_payments, update_payment,
    Payment, PaymentInput,
};
pub use resident::{
    create_resident, delete_resident, get_resident, list_residents, search_residents,
    update_resident, Resident, ResidentInput,
};
