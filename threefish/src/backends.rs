/// Implements `BlockBackend` for an encryptor/decryptor pair whose block
/// functions operate on eight little-endian words.
macro_rules! block_backends {
    ($encrypt:path, $decrypt:path) => {
        pub(crate) struct Encryptor<'a>(pub(crate) &'a $crate::KeySchedule);
        pub(crate) struct Decryptor<'a>(pub(crate) &'a $crate::KeySchedule);

        $crate::backends::block_backends!(@impl Encryptor, $encrypt);
        $crate::backends::block_backends!(@impl Decryptor, $decrypt);
    };
    (@impl $name:ident, $func:path) => {
        impl cipher::BlockSizeUser for $name<'_> {
            type BlockSize = cipher::consts::U64;
        }

        impl cipher::ParBlocksSizeUser for $name<'_> {
            type ParBlocksSize = cipher::consts::U1;
        }

        impl cipher::BlockBackend for $name<'_> {
            #[inline(always)]
            #[allow(unused_unsafe)]
            fn proc_block(&mut self, mut block: cipher::inout::InOut<'_, '_, cipher::Block<Self>>) {
                let mut words = [0u64; $crate::WORDS];
                velocipher_core::endian::read_u64_le(block.get_in(), &mut words);
                unsafe { $func(self.0, &mut words) };
                velocipher_core::endian::write_u64_le(&words, block.get_out());
            }
        }
    };
}

pub(crate) use block_backends;

pub(crate) mod soft;

cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        pub(crate) mod avx2;
        pub(crate) mod sse2;
    } else if #[cfg(all(target_arch = "aarch64", target_feature = "neon"))] {
        pub(crate) mod neon;
    }
}
