//! The joined master dataset: evaluation join, column codecs, CSV I/O and
//! participant-level splits.

pub mod codec;
pub mod error;
pub mod join;
pub mod master;
pub mod split;

pub use codec::{decode_features, decode_subtrial, encode_features, encode_subtrial};
pub use error::{DatasetError, JoinError};
pub use join::{JoinOutput, join};
pub use master::{load_master, read_master, save_master, write_master};
pub use split::{Split, split_by_participant};
