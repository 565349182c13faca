#![no_main]

use edt_scz::{
  CompressOptions,
  DecompressOptions,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
  let Some((&size, input)) = data.split_first() else {
    return;
  };
  let options = CompressOptions {
    segment_size: usize::from(size).max(1) * 64,
  };
  let packed = edt_scz::compress(input, &options).expect("fuzz inputs fit in one container");
  let decoded = edt_scz::decompress(&packed, &DecompressOptions::default()).expect("own output decodes");
  assert_eq!(decoded.checksum_mismatches, 0);
  assert_eq!(decoded.bytes, input);
});
