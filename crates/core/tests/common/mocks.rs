use mockall::mock;
use procsim_core::trace::{DecodedInst, InstructionSource};

mock! {
    pub Source {}
    impl InstructionSource for Source {
        fn read_instruction(&mut self) -> Option<DecodedInst>;
    }
}
