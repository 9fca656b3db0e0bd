//! Encoding orchestrator: drives an accumulated input through bit-stream
//! assembly, Reed-Solomon coding, placement and mask selection.

use tracing::debug;

use crate::encoder::frame::Frame;
use crate::encoder::input::QrInput;
use crate::encoder::mask::MaskEvaluator;
use crate::encoder::placement::{self, ZigzagFiller};
use crate::encoder::reed_solomon;
use crate::encoder::tables;
use crate::encoder::EncodeError;
use crate::models::{QrSymbol, Version};

/// Turns a [`QrInput`] into a finished symbol
pub struct QrEncoder;

impl QrEncoder {
    /// Encode the accumulated input into a symbol.
    ///
    /// The version resolved from the bit estimate is retried upward if the
    /// materialized stream turns out larger than estimated; the retry is
    /// internal and bounded by the largest version of the family.
    pub fn encode(input: &QrInput) -> Result<QrSymbol, EncodeError> {
        let mut version = input.resolve_version()?;
        let stream = loop {
            match input.build_bit_stream(version) {
                Ok(stream) => break stream,
                Err(err @ EncodeError::CapacityExceeded { .. }) => {
                    version = match version {
                        Version::Normal(v) if v < 40 => Version::Normal(v + 1),
                        Version::Micro(v) if v < 4 => Version::Micro(v + 1),
                        _ => return Err(err),
                    };
                }
                Err(err) => return Err(err),
            }
        };

        let data = stream.to_bytes();
        let codewords = match version {
            Version::Normal(v) => {
                let blocks = reed_solomon::build_blocks(&data, v, input.level());
                reed_solomon::interleave(&blocks)
            }
            Version::Micro(v) => {
                let ecc = tables::micro_ecc_codewords(v, input.level())
                    .ok_or(EncodeError::InvalidLevel {
                        level: input.level(),
                    })?;
                reed_solomon::micro_codewords(&data, ecc)
            }
        };

        let bits = placement::codeword_bits(&codewords, version, data.len());
        let mut frame = Frame::template(version);
        ZigzagFiller::place(&mut frame, &bits);

        let (mask, modules) = MaskEvaluator::select(&frame, input.level());
        debug!(
            version = version.number(),
            micro = version.is_micro(),
            mask,
            "encoded symbol"
        );
        Ok(QrSymbol {
            version,
            level: input.level(),
            mask,
            modules,
        })
    }
}
