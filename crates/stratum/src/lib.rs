use {
    bitcoin::{BlockHash, CompactTarget, Target, block, hashes::sha256d},
    byteorder::{BigEndian, ByteOrder},
    primitive_types::U256,
    serde::{
        Deserialize, Serialize, Serializer,
        de::{self, Deserializer},
        ser::SerializeSeq,
    },
    serde_json::{Value, json},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::Snafu,
    std::{
        fmt::{self, Formatter},
        str::FromStr,
        sync::LazyLock,
    },
};

pub use {
    authorize::Authorize,
    difficulty::Difficulty,
    error::{InternalError, JsonRpcError, Result},
    event::Event,
    extranonce::Extranonce,
    job_id::JobId,
    merkle::{MerkleNode, merkle_root},
    message::{Id, Message},
    nbits::Nbits,
    nonce::Nonce,
    notify::Notify,
    ntime::Ntime,
    prevhash::PrevHash,
    set_difficulty::SetDifficulty,
    si::{format_si, parse_si},
    submit::Submit,
    subscribe::{Subscribe, SubscribeResult},
    version::Version,
};

#[cfg(feature = "client")]
pub use client::{Client, ClientConfig, ClientError, EventReceiver};

/// Guards against a misbehaving peer streaming an unbounded line; no real Stratum frame
/// comes close to this.
pub const MAX_MESSAGE_SIZE: usize = 32 * 1024;

mod authorize;
mod difficulty;
mod error;
mod event;
mod extranonce;
mod job_id;
mod merkle;
mod message;
mod nbits;
mod nonce;
mod notify;
mod ntime;
mod prevhash;
mod set_difficulty;
mod si;
mod submit;
mod subscribe;
mod version;

#[cfg(feature = "client")]
mod client;
