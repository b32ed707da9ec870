//! Fixed-layout binary codec for frame-timing packets
//!
//! Every packet is a packed little-endian record whose layout is fixed by the
//! [`ProtocolVersion`] chosen at connect time. Fields are grouped by type:
//! doubles, then floats, then integers, then a trailing `u64` counter.
//!
//! ## Current layout (60 bytes)
//!
//! ```text
//! off  type  field
//!   0  f64   fps
//!   8  f32   frametime_ms
//!  12  f32   cpu_load
//!  16  f32   cpu_power_w
//!  20  i32   cpu_mhz
//!  24  i32   gpu_load
//!  28  i32   cpu_temp_c
//!  32  i32   gpu_temp_c
//!  36  i32   gpu_core_clock_mhz
//!  40  i32   gpu_mem_clock_mhz
//!  44  i32   gpu_power_w
//!  48  f32   fps_1_percent_low
//!  52  u64   elapsed_ns
//! ```
//!
//! ## Legacy layout (88 bytes)
//!
//! Same grouping, with VRAM/RAM/swap/RSS usage after `cpu_power_w`, junction
//! temperature after `gpu_temp_c`, and the 0.1% low and 97th percentile after
//! `fps_1_percent_low`.

use thiserror::Error;
use tracing::trace;

use crate::types::{LegacyExtras, ProtocolVersion, Sample};

/// Reasons a frame is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("{found} bytes do not fit {version} frames")]
    LengthMismatch { version: ProtocolVersion, expected: usize, found: usize },

    #[error("Field '{field}' has invalid value {value}")]
    InvalidField { field: &'static str, value: f64 },
}

/// Stateless encoder/decoder bound to one protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketCodec {
    version: ProtocolVersion,
}

impl PacketCodec {
    pub const fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }

    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Byte length every frame must have
    pub const fn frame_len(&self) -> usize {
        self.version.frame_len()
    }

    /// Decode one frame.
    ///
    /// The buffer is validated as a whole: a wrong length or an invalid
    /// fps/frametime rejects the frame without producing a partial sample.
    pub fn decode(&self, data: &[u8]) -> Result<Sample, DecodeError> {
        let expected = self.frame_len();
        if data.len() != expected {
            return Err(DecodeError::LengthMismatch {
                version: self.version,
                expected,
                found: data.len(),
            });
        }

        let mut fields = FieldReader::new(data);
        let sample = match self.version {
            ProtocolVersion::Current => {
                let fps = fields.f64();
                let frametime_ms = fields.f32();
                let cpu_load = fields.f32();
                let cpu_power_w = fields.f32();
                let cpu_mhz = fields.i32();
                let gpu_load = fields.i32();
                let cpu_temp_c = fields.i32();
                let gpu_temp_c = fields.i32();
                let gpu_core_clock_mhz = fields.i32();
                let gpu_mem_clock_mhz = fields.i32();
                let gpu_power_w = fields.i32();
                let fps_1_percent_low = fields.f32();
                let elapsed_ns = fields.u64();
                Sample {
                    fps,
                    frametime_ms,
                    cpu_load,
                    cpu_power_w,
                    cpu_mhz,
                    gpu_load,
                    cpu_temp_c,
                    gpu_temp_c,
                    gpu_core_clock_mhz,
                    gpu_mem_clock_mhz,
                    gpu_power_w,
                    fps_1_percent_low,
                    elapsed_ns,
                    extras: None,
                }
            }
            ProtocolVersion::Legacy88 => {
                let fps = fields.f64();
                let frametime_ms = fields.f32();
                let cpu_load = fields.f32();
                let cpu_power_w = fields.f32();
                let gpu_vram_used_gb = fields.f32();
                let ram_used_gb = fields.f32();
                let swap_used_gb = fields.f32();
                let process_rss_gb = fields.f32();
                let cpu_mhz = fields.i32();
                let gpu_load = fields.i32();
                let cpu_temp_c = fields.i32();
                let gpu_temp_c = fields.i32();
                let gpu_junction_temp_c = fields.i32();
                let gpu_core_clock_mhz = fields.i32();
                let gpu_mem_clock_mhz = fields.i32();
                let gpu_power_w = fields.i32();
                let fps_1_percent_low = fields.f32();
                let fps_0_1_percent_low = fields.f32();
                let fps_97th_percentile = fields.f32();
                let elapsed_ns = fields.u64();
                Sample {
                    fps,
                    frametime_ms,
                    cpu_load,
                    cpu_power_w,
                    cpu_mhz,
                    gpu_load,
                    cpu_temp_c,
                    gpu_temp_c,
                    gpu_core_clock_mhz,
                    gpu_mem_clock_mhz,
                    gpu_power_w,
                    fps_1_percent_low,
                    elapsed_ns,
                    extras: Some(LegacyExtras {
                        gpu_vram_used_gb,
                        ram_used_gb,
                        swap_used_gb,
                        process_rss_gb,
                        gpu_junction_temp_c,
                        fps_0_1_percent_low,
                        fps_97th_percentile,
                    }),
                }
            }
        };

        validate(&sample)?;
        trace!(fps = sample.fps, frametime_ms = sample.frametime_ms, "Decoded sample");
        Ok(sample)
    }

    /// Encode a sample in this codec's layout.
    ///
    /// Legacy frames written from a sample without extras carry zeroes in the
    /// extra fields.
    pub fn encode(&self, sample: &Sample) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.frame_len());
        out.extend_from_slice(&sample.fps.to_le_bytes());
        out.extend_from_slice(&sample.frametime_ms.to_le_bytes());
        out.extend_from_slice(&sample.cpu_load.to_le_bytes());
        out.extend_from_slice(&sample.cpu_power_w.to_le_bytes());

        match self.version {
            ProtocolVersion::Current => {
                for value in [
                    sample.cpu_mhz,
                    sample.gpu_load,
                    sample.cpu_temp_c,
                    sample.gpu_temp_c,
                    sample.gpu_core_clock_mhz,
                    sample.gpu_mem_clock_mhz,
                    sample.gpu_power_w,
                ] {
                    out.extend_from_slice(&value.to_le_bytes());
                }
                out.extend_from_slice(&sample.fps_1_percent_low.to_le_bytes());
            }
            ProtocolVersion::Legacy88 => {
                let extras = sample.extras.unwrap_or_default();
                for value in [
                    extras.gpu_vram_used_gb,
                    extras.ram_used_gb,
                    extras.swap_used_gb,
                    extras.process_rss_gb,
                ] {
                    out.extend_from_slice(&value.to_le_bytes());
                }
                for value in [
                    sample.cpu_mhz,
                    sample.gpu_load,
                    sample.cpu_temp_c,
                    sample.gpu_temp_c,
                    extras.gpu_junction_temp_c,
                    sample.gpu_core_clock_mhz,
                    sample.gpu_mem_clock_mhz,
                    sample.gpu_power_w,
                ] {
                    out.extend_from_slice(&value.to_le_bytes());
                }
                for value in [
                    sample.fps_1_percent_low,
                    extras.fps_0_1_percent_low,
                    extras.fps_97th_percentile,
                ] {
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }
        }

        out.extend_from_slice(&sample.elapsed_ns.to_le_bytes());
        debug_assert_eq!(out.len(), self.frame_len());
        out
    }
}

fn validate(sample: &Sample) -> Result<(), DecodeError> {
    if !sample.fps.is_finite() || sample.fps < 0.0 {
        return Err(DecodeError::InvalidField { field: "fps", value: sample.fps });
    }

    // Zero frametime would mean infinite fps
    let frametime = f64::from(sample.frametime_ms);
    if !frametime.is_finite() || frametime <= 0.0 {
        return Err(DecodeError::InvalidField { field: "frametime_ms", value: frametime });
    }

    Ok(())
}

/// Sequential little-endian field reader over a length-checked frame
struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        bytes
    }

    fn f64(&mut self) -> f64 {
        f64::from_le_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{legacy_sample, sample_with_frametime};
    use proptest::prelude::*;

    #[test]
    fn current_field_offsets() {
        let sample = Sample {
            fps: 143.5,
            frametime_ms: 6.97,
            gpu_power_w: 212,
            fps_1_percent_low: 98.0,
            elapsed_ns: 0x0102_0304_0506_0708,
            ..Default::default()
        };
        let bytes = PacketCodec::new(ProtocolVersion::Current).encode(&sample);

        assert_eq!(bytes.len(), 60);
        assert_eq!(&bytes[0..8], &143.5f64.to_le_bytes());
        assert_eq!(&bytes[8..12], &6.97f32.to_le_bytes());
        assert_eq!(&bytes[44..48], &212i32.to_le_bytes());
        assert_eq!(&bytes[48..52], &98.0f32.to_le_bytes());
        assert_eq!(&bytes[52..60], &0x0102_0304_0506_0708u64.to_le_bytes());
    }

    #[test]
    fn legacy_field_offsets() {
        let sample = legacy_sample(8.0);
        let extras = sample.extras.unwrap();
        let bytes = PacketCodec::new(ProtocolVersion::Legacy88).encode(&sample);

        assert_eq!(bytes.len(), 88);
        assert_eq!(&bytes[20..24], &extras.gpu_vram_used_gb.to_le_bytes());
        assert_eq!(&bytes[52..56], &extras.gpu_junction_temp_c.to_le_bytes());
        assert_eq!(&bytes[72..76], &extras.fps_0_1_percent_low.to_le_bytes());
        assert_eq!(&bytes[80..88], &sample.elapsed_ns.to_le_bytes());
    }

    #[test]
    fn decodes_legacy_extras() {
        let codec = PacketCodec::new(ProtocolVersion::Legacy88);
        let sample = legacy_sample(16.6);
        let decoded = codec.decode(&codec.encode(&sample)).unwrap();
        assert_eq!(decoded, sample);
        assert!(decoded.extras.is_some());
    }

    #[test]
    fn versions_are_not_interchangeable() {
        let legacy = PacketCodec::new(ProtocolVersion::Legacy88).encode(&legacy_sample(8.0));
        let err = PacketCodec::new(ProtocolVersion::Current).decode(&legacy).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch { version: ProtocolVersion::Current, expected: 60, found: 88 }
        );
    }

    #[test]
    fn rejects_zero_frametime() {
        let codec = PacketCodec::default();
        let bytes = codec.encode(&sample_with_frametime(0.0));
        assert!(matches!(
            codec.decode(&bytes),
            Err(DecodeError::InvalidField { field: "frametime_ms", .. })
        ));
    }

    #[test]
    fn rejects_negative_and_nan_fps() {
        let codec = PacketCodec::default();
        for fps in [-1.0, f64::NAN, f64::INFINITY] {
            let sample = Sample { fps, ..sample_with_frametime(8.0) };
            assert!(matches!(
                codec.decode(&codec.encode(&sample)),
                Err(DecodeError::InvalidField { field: "fps", .. })
            ));
        }
    }

    fn arb_sample() -> impl Strategy<Value = Sample> {
        (
            (0.0f64..10_000.0, 0.01f32..1_000.0, 0.0f32..100.0, 0.0f32..500.0),
            prop::array::uniform7(any::<i32>()),
            (0.0f32..10_000.0, any::<u64>()),
        )
            .prop_map(|((fps, frametime_ms, cpu_load, cpu_power_w), ints, (low, elapsed_ns))| {
                Sample {
                    fps,
                    frametime_ms,
                    cpu_load,
                    cpu_power_w,
                    cpu_mhz: ints[0],
                    gpu_load: ints[1],
                    cpu_temp_c: ints[2],
                    gpu_temp_c: ints[3],
                    gpu_core_clock_mhz: ints[4],
                    gpu_mem_clock_mhz: ints[5],
                    gpu_power_w: ints[6],
                    fps_1_percent_low: low,
                    elapsed_ns,
                    extras: None,
                }
            })
    }

    proptest! {
        #[test]
        fn decode_then_encode_reproduces_bytes(sample in arb_sample()) {
            let codec = PacketCodec::new(ProtocolVersion::Current);
            let bytes = codec.encode(&sample);
            let decoded = codec.decode(&bytes).unwrap();
            prop_assert_eq!(codec.encode(&decoded), bytes);
            prop_assert_eq!(decoded, sample);
        }

        #[test]
        fn wrong_length_always_fails(len in 0usize..256) {
            prop_assume!(len != 60);
            let codec = PacketCodec::new(ProtocolVersion::Current);
            let buf = vec![0x11u8; len];
            prop_assert_eq!(
                codec.decode(&buf),
                Err(DecodeError::LengthMismatch { version: ProtocolVersion::Current, expected: 60, found: len })
            );
        }

        #[test]
        fn legacy_wrong_length_always_fails(len in 0usize..256) {
            prop_assume!(len != 88);
            let codec = PacketCodec::new(ProtocolVersion::Legacy88);
            let is_length_mismatch = matches!(codec.decode(&vec![0u8; len]), Err(DecodeError::LengthMismatch { .. }));
            prop_assert!(is_length_mismatch);
        }
    }
}
