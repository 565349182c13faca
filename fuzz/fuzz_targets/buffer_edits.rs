#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;

use crate::common::{
  apply,
  check,
  session_from_bytes,
};

fuzz_target!(|data: &[u8]| {
  let mut fuzz = session_from_bytes(data);
  check(&fuzz.session);
  for op in &fuzz.ops {
    apply(&mut fuzz.session, op);
    check(&fuzz.session);
  }
  let _ = fuzz.session.serialize();
});
