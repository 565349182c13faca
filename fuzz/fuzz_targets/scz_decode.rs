#![no_main]

use edt_scz::{
  ChecksumPolicy,
  DecompressOptions,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
  let strict = DecompressOptions {
    checksum: ChecksumPolicy::Strict,
  };
  let lenient = edt_scz::decompress(data, &DecompressOptions::default());
  if let Ok(decoded) = edt_scz::decompress(data, &strict) {
    assert_eq!(decoded.checksum_mismatches, 0);
    assert_eq!(lenient.ok().map(|lenient| lenient.bytes), Some(decoded.bytes));
  }
});
