//! CREATE contract address computation.
//!
//! The address of the contract deployed by `sender` with transaction nonce `n`:
//!   address = keccak256(rlp([sender, n]))[12:32]

use super::{keccak256, Address};

/// Largest possible encoding: list header (1) + address (1 + 20) + nonce (1 + 8).
pub const MAX_RLP_LEN: usize = 31;

/// RLP-encodes the two-item list `[sender, nonce]` into `out`, returning the used length.
///
/// The nonce is written as its minimal big-endian form; zero is the empty
/// string (`0x80`) and values below `0x80` encode as themselves. The payload
/// never reaches 56 bytes, so the list header is always a single byte.
pub fn rlp_sender_nonce(sender: &Address, nonce: u64, out: &mut [u8; MAX_RLP_LEN]) -> usize {
    let be = nonce.to_be_bytes();
    let skip = be.iter().position(|&b| b != 0).unwrap_or(be.len());
    let significant = &be[skip..];

    let mut pos = 1;
    out[pos] = 0x80 + 20;
    pos += 1;
    out[pos..pos + 20].copy_from_slice(sender.as_bytes());
    pos += 20;

    match significant {
        [] => {
            out[pos] = 0x80;
            pos += 1;
        }
        [b] if *b < 0x80 => {
            out[pos] = *b;
            pos += 1;
        }
        bytes => {
            out[pos] = 0x80 + bytes.len() as u8;
            pos += 1;
            out[pos..pos + bytes.len()].copy_from_slice(bytes);
            pos += bytes.len();
        }
    }

    out[0] = 0xc0 + (pos - 1) as u8;
    pos
}

/// Computes the address of the contract created by `sender` at `nonce`.
pub fn contract_address(sender: &Address, nonce: u64) -> Address {
    let mut buf = [0u8; MAX_RLP_LEN];
    let len = rlp_sender_nonce(sender, nonce, &mut buf);

    let hash = keccak256(&buf[..len]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::from_bytes(addr)
}
