use serde::{Deserialize, Serialize};

/// An opaque transaction as delivered by a vida subscription.
///
/// `data` travels as a hex string (with or without a `0x` prefix) in the
/// network's JSON form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub block_number: u64,
    pub vida_id: u64,
    #[serde(default)]
    pub sender: String,
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
}

mod hex_data {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(data: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex::encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        super::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
}

impl Transaction {
    pub fn new(hash: impl Into<String>, block_number: u64, vida_id: u64, data: Vec<u8>) -> Self {
        Transaction {
            hash: hash.into(),
            block_number,
            vida_id,
            sender: String::new(),
            data,
        }
    }

    /// Build a transaction from hex-encoded payload data.
    pub fn from_hex(
        hash: impl Into<String>,
        block_number: u64,
        vida_id: u64,
        data_hex: &str,
    ) -> Result<Self, hex::FromHexError> {
        Ok(Self::new(hash, block_number, vida_id, decode_hex(data_hex)?))
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}
