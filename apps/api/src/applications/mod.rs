// Application review workflow: submit, approve, reject.
// Rejected applications move out of the active set into a separate archive;
// the ledger is the only code allowed to touch either.

pub mod handlers;
pub mod ledger;
