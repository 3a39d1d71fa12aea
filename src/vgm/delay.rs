//! Wait opcode encoding

use super::commands::{opcode, SAMPLES_50TH, SAMPLES_60TH};

const MAX_WAIT_NNNN: u64 = u16::MAX as u64;

/// Encode a wait of `samples` as the shortest run of wait opcodes
pub fn generate_delay(samples: u64) -> Vec<u8> {
    let mut out = Vec::new();
    let mut remaining = samples;

    while remaining > MAX_WAIT_NNNN {
        out.extend_from_slice(&[opcode::WAIT_NNNN, 0xFF, 0xFF]);
        remaining -= MAX_WAIT_NNNN;
    }

    let frame_60 = SAMPLES_60TH as u64;
    let frame_50 = SAMPLES_50TH as u64;
    match remaining {
        0 => {}
        1..=16 => out.push(short_wait(remaining)),
        17..=32 => {
            out.push(short_wait(16));
            out.push(short_wait(remaining - 16));
        }
        r if r == frame_60 => out.push(opcode::WAIT_60TH),
        r if r == frame_50 => out.push(opcode::WAIT_50TH),
        r if r == 2 * frame_60 => out.extend_from_slice(&[opcode::WAIT_60TH; 2]),
        r if r == 2 * frame_50 => out.extend_from_slice(&[opcode::WAIT_50TH; 2]),
        r if r == frame_60 + frame_50 => {
            out.extend_from_slice(&[opcode::WAIT_60TH, opcode::WAIT_50TH])
        }
        r => {
            let [lo, hi] = (r as u16).to_le_bytes();
            out.extend_from_slice(&[opcode::WAIT_NNNN, lo, hi]);
        }
    }
    out
}

/// 0x7n waits n+1 samples; `samples` must be 1..=16
fn short_wait(samples: u64) -> u8 {
    opcode::WAIT_N_BASE + (samples as u8 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded_total(bytes: &[u8]) -> u64 {
        let mut total = 0u64;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                0x61 => {
                    total += u16::from_le_bytes([bytes[i + 1], bytes[i + 2]]) as u64;
                    i += 3;
                }
                0x62 => {
                    total += 735;
                    i += 1;
                }
                0x63 => {
                    total += 882;
                    i += 1;
                }
                op @ 0x70..=0x7F => {
                    total += (op & 0x0F) as u64 + 1;
                    i += 1;
                }
                op => panic!("unexpected opcode {:#04x}", op),
            }
        }
        total
    }

    #[test]
    fn test_zero_is_empty() {
        assert!(generate_delay(0).is_empty());
    }

    #[test]
    fn test_short_waits() {
        assert_eq!(generate_delay(1), vec![0x70]);
        assert_eq!(generate_delay(16), vec![0x7F]);
        assert_eq!(generate_delay(20), vec![0x7F, 0x73]);
    }

    #[test]
    fn test_frame_waits() {
        assert_eq!(generate_delay(735), vec![0x62]);
        assert_eq!(generate_delay(882), vec![0x63]);
        assert_eq!(generate_delay(1470), vec![0x62, 0x62]);
        assert_eq!(generate_delay(1617), vec![0x62, 0x63]);
    }

    #[test]
    fn test_16bit_wait() {
        assert_eq!(generate_delay(1000), vec![0x61, 0xE8, 0x03]);
        assert_eq!(generate_delay(44100), vec![0x61, 0x44, 0xAC]);
    }

    #[test]
    fn test_long_wait_splits() {
        let bytes = generate_delay(100_000);
        assert_eq!(&bytes[..3], &[0x61, 0xFF, 0xFF]);
        assert_eq!(decoded_total(&bytes), 100_000);
    }

    #[test]
    fn test_totals_preserved() {
        for samples in [33, 734, 736, 883, 65535, 65536, 131_070, 200_001] {
            assert_eq!(decoded_total(&generate_delay(samples)), samples);
        }
    }
}
