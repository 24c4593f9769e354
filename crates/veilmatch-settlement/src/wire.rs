//! Wire codec for the settlement artifact.
//!
//! On-chain shape:
//!
//! ```text
//! clearing_price (16 B BE)
//! n_fills        (u32 BE)
//! [ order_id (32 B) || fill_envelope (99 B) ] × n_fills
//! proof_len      (u32 BE)
//! proof_bytes
//! ```
//!
//! Decoding is total: truncated, oversized, or trailing input yields a
//! structured error, never a panic or a silent truncation.

use sha2::{Digest, Sha256};
use veilmatch_types::{
    EncryptedAmount, Fill, Fp, OrderId, Result, Settlement, VeilmatchError,
    constants::{ENVELOPE_LEN, MAX_ORDERS_PER_BATCH, MAX_PROOF_SIZE},
};

/// The fields that actually cross the wire. Informational settlement
/// fields (matched volume, abort reason, digest) stay off-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireSettlement {
    pub clearing_price: Fp,
    pub fills: Vec<Fill>,
    pub proof_blob: Vec<u8>,
}

impl WireSettlement {
    /// Re-encode to the exact wire form. `decode` ∘ `to_bytes` and
    /// `to_bytes` ∘ `decode` are identities.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_parts(self.clearing_price, &self.fills, &self.proof_blob)
    }
}

/// Encode a settlement into its wire form.
#[must_use]
pub fn encode(settlement: &Settlement) -> Vec<u8> {
    encode_parts(
        settlement.clearing_price,
        &settlement.fills,
        &settlement.proof_blob,
    )
}

fn encode_parts(clearing_price: Fp, fills: &[Fill], proof_blob: &[u8]) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(16 + 4 + fills.len() * (32 + ENVELOPE_LEN) + 4 + proof_blob.len());
    out.extend_from_slice(&clearing_price.to_be_bytes());
    out.extend_from_slice(&(fills.len() as u32).to_be_bytes());
    for fill in fills {
        out.extend_from_slice(fill.order_id.as_bytes());
        out.extend_from_slice(&fill.envelope.to_bytes());
    }
    out.extend_from_slice(&(proof_blob.len() as u32).to_be_bytes());
    out.extend_from_slice(proof_blob);
    out
}

/// Decode a wire payload back into its settlement fields.
pub fn decode(bytes: &[u8]) -> Result<WireSettlement> {
    let mut cursor = Cursor::new(bytes);

    let clearing_price = Fp::from_be_bytes(cursor.take_array::<16>()?);

    let n_fills = u32::from_be_bytes(cursor.take_array::<4>()?) as usize;
    if n_fills > MAX_ORDERS_PER_BATCH {
        return Err(VeilmatchError::FillCountExceeded {
            count: n_fills,
            max: MAX_ORDERS_PER_BATCH,
        });
    }

    let mut fills = Vec::with_capacity(n_fills);
    for _ in 0..n_fills {
        let order_id = OrderId::from_bytes(cursor.take_array::<32>()?);
        let envelope_bytes = cursor.take(ENVELOPE_LEN)?;
        let envelope = EncryptedAmount::parse(envelope_bytes)
            .ok_or(VeilmatchError::InvalidEnvelope { len: ENVELOPE_LEN })?;
        fills.push(Fill { order_id, envelope });
    }

    let proof_len = u32::from_be_bytes(cursor.take_array::<4>()?) as usize;
    if proof_len > MAX_PROOF_SIZE {
        return Err(VeilmatchError::ProofOversized {
            len: proof_len,
            max: MAX_PROOF_SIZE,
        });
    }
    let proof_blob = cursor.take(proof_len)?.to_vec();

    cursor.finish()?;

    Ok(WireSettlement {
        clearing_price,
        fills,
        proof_blob,
    })
}

/// Domain-separated SHA-256 over the wire bytes; stamped into
/// [`Settlement::digest`] for cross-run determinism checks.
#[must_use]
pub fn digest_bytes(wire: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"veilmatch:settlement:v1:");
    hasher.update(wire);
    hasher.finalize().into()
}

/// Bounds-checked reader over the wire payload.
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or(VeilmatchError::WireTruncated {
            expected: usize::MAX,
            actual: self.bytes.len(),
        })?;
        if end > self.bytes.len() {
            return Err(VeilmatchError::WireTruncated {
                expected: end,
                actual: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take(N)?;
        slice
            .try_into()
            .map_err(|_| VeilmatchError::Internal("cursor length mismatch".into()))
    }

    fn finish(&self) -> Result<()> {
        let extra = self.bytes.len() - self.offset;
        if extra > 0 {
            return Err(VeilmatchError::WireTrailingBytes { extra });
        }
        Ok(())
    }
}
