/// Invoke `$m!` once for every tuple arity from 26 (`A` through `Z`) down to 1.
///
/// `$m` receives the type parameter names of one arity, e.g. `$m!(X, Y, Z)`.
#[doc(hidden)]
#[macro_export]
macro_rules! all_tuples {
    ($m:ident) => {
        $crate::all_tuples!(@peel $m; A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z);
    };
    (@peel $m:ident; $last:ident) => {
        $m!($last);
    };
    (@peel $m:ident; $head:ident, $($tail:ident),+) => {
        $m!($head, $($tail),+);
        $crate::all_tuples!(@peel $m; $($tail),+);
    };
}

#[cfg(test)]
mod tests {
    trait Arity {
        const ARITY: usize;
    }

    macro_rules! arity {
        ($($name:ident),*) => {
            impl<$($name),*> Arity for ($($name,)*) {
                const ARITY: usize = [$(stringify!($name)),*].len();
            }
        };
    }

    all_tuples!(arity);

    #[test]
    fn every_arity_is_covered() {
        assert_eq!(<(u8,)>::ARITY, 1);
        assert_eq!(<(u8, f32, bool)>::ARITY, 3);
        assert_eq!(
            <(
                u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
                u8, u8, u8, u8, u8,
            )>::ARITY,
            26
        );
    }
}
