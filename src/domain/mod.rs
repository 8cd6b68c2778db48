pub mod settings;
pub use settings::{Assignment, LoadStatus, SettingsPath, SettingsTree, ValueKind};

pub mod signature;
pub use signature::{Signature, SignatureFile};

pub mod sendas;
pub use sendas::{SendAs, SendAsChanges};

pub mod shared_store;
pub use shared_store::{FolderType, SharedStore};

pub mod files;
pub use files::{FileAccount, FileAccountEntry, FileBackend};

pub mod options;
pub use options::{HtmlEditor, IconSet};

pub mod categories;

pub mod recipients;
pub use recipients::{Recipient, RecipientHistory};

pub mod smime;
pub use smime::{Certificate, CertificateKind, Certificates};

pub mod config;
pub use config::AdminConfig;
