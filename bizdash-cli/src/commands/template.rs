use bizdash_core::EntityKind;

pub fn run(kind: EntityKind) {
    println!("{}", kind.template_header());
}
