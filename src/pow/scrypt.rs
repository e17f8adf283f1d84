//! A from-scratch scrypt(N, r=1, p=1) implementation per RFC 7914, specialized to the
//! r=1/p=1 case this miner needs. No published crate in this workspace's lineage covers
//! scrypt, so the PBKDF2/Salsa20-8/BlockMix/SMix pipeline below follows the RFC directly.

use {
    super::Kernel,
    anyhow::{bail, Result},
    hmac::{Hmac, Mac},
    sha2::Sha256,
};

type HmacSha256 = Hmac<Sha256>;

const BLOCK_BYTES: usize = 64;

/// scrypt(N, r=1, p=1, dkLen=32) using the block header as both password and salt.
#[derive(Debug, Clone)]
pub struct Scrypt {
    n: u32,
}

impl Scrypt {
    pub fn new(n: u32) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            bail!("scrypt N must be a power of two >= 2, got {n}");
        }
        Ok(Self { n })
    }
}

impl Default for Scrypt {
    fn default() -> Self {
        Self::new(1024).expect("1024 is a valid scrypt N")
    }
}

impl Kernel for Scrypt {
    fn hash(&self, header: &[u8; 80]) -> [u8; 32] {
        scrypt(header, header, self.n, 1, 1, 32)
            .try_into()
            .expect("dkLen=32 produces a 32-byte digest")
    }
}

fn scrypt(password: &[u8], salt: &[u8], n: u32, r: u32, p: u32, dk_len: usize) -> Vec<u8> {
    let block_size = 128 * r as usize;
    let mut b = pbkdf2_hmac_sha256_one_iter(password, salt, p as usize * block_size);

    for i in 0..p as usize {
        let block = &mut b[i * block_size..(i + 1) * block_size];
        rom_mix(block, n, r);
    }

    pbkdf2_hmac_sha256_one_iter(password, &b, dk_len)
}

/// PBKDF2-HMAC-SHA256 with a single iteration, which is all scrypt ever asks for: with
/// c=1 there is no F()-XOR-across-iterations step, just T_i = HMAC(P, S || INT_32_BE(i)).
fn pbkdf2_hmac_sha256_one_iter(password: &[u8], salt: &[u8], dk_len: usize) -> Vec<u8> {
    let hlen = 32;
    let blocks = dk_len.div_ceil(hlen);

    let mut dk = Vec::with_capacity(blocks * hlen);
    for i in 1..=blocks as u32 {
        let mut mac = HmacSha256::new_from_slice(password).expect("HMAC accepts any key length");
        mac.update(salt);
        mac.update(&i.to_be_bytes());
        dk.extend_from_slice(&mac.finalize().into_bytes());
    }

    dk.truncate(dk_len);
    dk
}

/// ROMix: builds the lookup table V by repeatedly applying BlockMix, then mixes it back in
/// using indices derived from the running state. Operates on `2*r` 64-byte sub-blocks in place.
fn rom_mix(block: &mut [u8], n: u32, r: u32) {
    let block_len = block.len();
    let mut x = block.to_vec();

    let mut v = vec![0u8; block_len * n as usize];
    for i in 0..n as usize {
        v[i * block_len..(i + 1) * block_len].copy_from_slice(&x);
        block_mix(&mut x, r);
    }

    let mut t = vec![0u8; block_len];
    for _ in 0..n {
        let j = integerify(&x, r) % n;
        let v_j = &v[j as usize * block_len..(j as usize + 1) * block_len];
        for (t_byte, (x_byte, v_byte)) in t.iter_mut().zip(x.iter().zip(v_j.iter())) {
            *t_byte = x_byte ^ v_byte;
        }
        x.copy_from_slice(&t);
        block_mix(&mut x, r);
    }

    block.copy_from_slice(&x);
}

/// Reads a little-endian u32 from the start of the last 64-byte sub-block, the quantity RFC
/// 7914 calls Integerify(X) for the r=1 case this miner uses (N never exceeds 2^32, so the
/// low 32 bits of that sub-block are equivalent to treating the whole thing as one integer).
fn integerify(x: &[u8], r: u32) -> u32 {
    let offset = (2 * r as usize - 1) * BLOCK_BYTES;
    u32::from_le_bytes(x[offset..offset + 4].try_into().unwrap())
}

/// BlockMix_{Salsa20/8,r}: runs Salsa20/8 over each of the `2r` sub-blocks, chaining the
/// running state, then deinterleaves the results into even/odd halves.
fn block_mix(block: &mut [u8], r: u32) {
    let blocks = 2 * r as usize;
    let mut x = [0u8; BLOCK_BYTES];
    x.copy_from_slice(&block[(blocks - 1) * BLOCK_BYTES..blocks * BLOCK_BYTES]);

    let mut y = vec![0u8; block.len()];
    for i in 0..blocks {
        let b_i = &block[i * BLOCK_BYTES..(i + 1) * BLOCK_BYTES];
        for (x_byte, b_byte) in x.iter_mut().zip(b_i.iter()) {
            *x_byte ^= b_byte;
        }
        x = salsa20_8(&x);
        y[i * BLOCK_BYTES..(i + 1) * BLOCK_BYTES].copy_from_slice(&x);
    }

    for i in 0..r as usize {
        block[i * BLOCK_BYTES..(i + 1) * BLOCK_BYTES]
            .copy_from_slice(&y[(2 * i) * BLOCK_BYTES..(2 * i + 1) * BLOCK_BYTES]);
        block[(r as usize + i) * BLOCK_BYTES..(r as usize + i + 1) * BLOCK_BYTES]
            .copy_from_slice(&y[(2 * i + 1) * BLOCK_BYTES..(2 * i + 2) * BLOCK_BYTES]);
    }
}

/// The Salsa20/8 core function: 8 rounds (4 double-rounds) over 16 little-endian u32 words,
/// output added word-wise (mod 2^32) to the input.
fn salsa20_8(input: &[u8; BLOCK_BYTES]) -> [u8; BLOCK_BYTES] {
    let mut x = [0u32; 16];
    for (word, chunk) in x.iter_mut().zip(input.chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().unwrap());
    }
    let initial = x;

    for _ in 0..4 {
        x[4] ^= (x[0].wrapping_add(x[12])).rotate_left(7);
        x[8] ^= (x[4].wrapping_add(x[0])).rotate_left(9);
        x[12] ^= (x[8].wrapping_add(x[4])).rotate_left(13);
        x[0] ^= (x[12].wrapping_add(x[8])).rotate_left(18);

        x[9] ^= (x[5].wrapping_add(x[1])).rotate_left(7);
        x[13] ^= (x[9].wrapping_add(x[5])).rotate_left(9);
        x[1] ^= (x[13].wrapping_add(x[9])).rotate_left(13);
        x[5] ^= (x[1].wrapping_add(x[13])).rotate_left(18);

        x[14] ^= (x[10].wrapping_add(x[6])).rotate_left(7);
        x[2] ^= (x[14].wrapping_add(x[10])).rotate_left(9);
        x[6] ^= (x[2].wrapping_add(x[14])).rotate_left(13);
        x[10] ^= (x[6].wrapping_add(x[2])).rotate_left(18);

        x[3] ^= (x[15].wrapping_add(x[11])).rotate_left(7);
        x[7] ^= (x[3].wrapping_add(x[15])).rotate_left(9);
        x[11] ^= (x[7].wrapping_add(x[3])).rotate_left(13);
        x[15] ^= (x[11].wrapping_add(x[7])).rotate_left(18);

        x[1] ^= (x[0].wrapping_add(x[3])).rotate_left(7);
        x[2] ^= (x[1].wrapping_add(x[0])).rotate_left(9);
        x[3] ^= (x[2].wrapping_add(x[1])).rotate_left(13);
        x[0] ^= (x[3].wrapping_add(x[2])).rotate_left(18);

        x[6] ^= (x[5].wrapping_add(x[4])).rotate_left(7);
        x[7] ^= (x[6].wrapping_add(x[5])).rotate_left(9);
        x[4] ^= (x[7].wrapping_add(x[6])).rotate_left(13);
        x[5] ^= (x[4].wrapping_add(x[7])).rotate_left(18);

        x[11] ^= (x[10].wrapping_add(x[9])).rotate_left(7);
        x[8] ^= (x[11].wrapping_add(x[10])).rotate_left(9);
        x[9] ^= (x[8].wrapping_add(x[11])).rotate_left(13);
        x[10] ^= (x[9].wrapping_add(x[8])).rotate_left(18);

        x[12] ^= (x[15].wrapping_add(x[14])).rotate_left(7);
        x[13] ^= (x[12].wrapping_add(x[15])).rotate_left(9);
        x[14] ^= (x[13].wrapping_add(x[12])).rotate_left(13);
        x[15] ^= (x[14].wrapping_add(x[13])).rotate_left(18);
    }

    let mut out = [0u8; BLOCK_BYTES];
    for i in 0..16 {
        let word = x[i].wrapping_add(initial[i]);
        out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    out
}
