#![no_main]

use libfuzzer_sys::fuzz_target;
use cilpatch::{
    assembly::{opcodes, Instruction, InstructionSequence, Operand},
    metadata::{signature::TargetOperation, token::Token},
    patch::{
        catalog::{STARTS_WITH, STARTS_WITH_COMPARISON},
        HostIntrospection, Interceptors, OperationHandle, PatchConfig,
    },
};

const STARTS_WITH_TOKEN: Token = Token::member_ref(0x31);
const ORDINAL_STARTS_WITH_TOKEN: Token = Token::member_ref(0x32);

struct StaticHost;

impl HostIntrospection for StaticHost {
    fn resolve(&self, target: &TargetOperation) -> Option<OperationHandle> {
        if *target == STARTS_WITH {
            Some(OperationHandle(STARTS_WITH_TOKEN))
        } else if *target == STARTS_WITH_COMPARISON {
            Some(OperationHandle(ORDINAL_STARTS_WITH_TOKEN))
        } else {
            None
        }
    }
}

fn decode(data: &[u8]) -> InstructionSequence {
    data.chunks(5)
        .map(|chunk| {
            let mut raw = [0u8; 4];
            for (dst, src) in raw.iter_mut().zip(chunk.iter().skip(1)) {
                *dst = *src;
            }
            let value = u32::from_le_bytes(raw);
            match chunk[0] % 6 {
                0 => Instruction::callvirt(STARTS_WITH_TOKEN),
                1 => Instruction::callvirt(Token::new(value)),
                2 => Instruction::new(opcodes::CALLVIRT, Operand::Local(value as u16)),
                3 => Instruction::ldc_i4(value as i32),
                4 => Instruction::call(Token::new(value)),
                _ => Instruction::nop(),
            }
        })
        .collect()
}

fn virtual_sites(body: &InstructionSequence) -> usize {
    body.iter()
        .filter(|instr| instr.is_virtual_call() && instr.call_target() == Some(STARTS_WITH_TOKEN))
        .count()
}

fuzz_target!(|data: &[u8]| {
    let input = decode(data);
    let interceptors = Interceptors::new(&PatchConfig::default());
    let output = interceptors.ordinal_starts_with(&StaticHost, &input);

    // Calls with non-token operands never match, so the rewrite always succeeds
    assert!(interceptors.faults().is_empty());
    assert_eq!(output.len(), input.len() + virtual_sites(&input));
    assert_eq!(virtual_sites(&output), 0);
});
