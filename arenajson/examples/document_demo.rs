// Example building a document in a fixed buffer and printing it back

use arenajson::{
    Buffer, CollectionData, Document, Error, Float, KeyKind, MemoryPool, UInt, Visitor,
};

/// Prints values as compact JSON
struct Printer;

impl Visitor for Printer {
    fn visit_null(&mut self) {
        print!("null");
    }

    fn visit_boolean(&mut self, value: bool) {
        print!("{}", value);
    }

    fn visit_positive_integer(&mut self, magnitude: UInt) {
        print!("{}", magnitude);
    }

    fn visit_negative_integer(&mut self, magnitude: UInt) {
        print!("-{}", magnitude);
    }

    fn visit_float(&mut self, value: Float) {
        print!("{}", value);
    }

    fn visit_string(&mut self, value: &str) {
        print!("{:?}", value);
    }

    fn visit_raw_json(&mut self, value: &[u8]) {
        print!("{}", String::from_utf8_lossy(value));
    }

    fn visit_array<B: Buffer>(&mut self, pool: &MemoryPool<'_, B>, array: CollectionData) {
        print!("[");
        for (index, (_, value)) in array.iter(pool).enumerate() {
            if index > 0 {
                print!(",");
            }
            value.accept(pool, self);
        }
        print!("]");
    }

    fn visit_object<B: Buffer>(&mut self, pool: &MemoryPool<'_, B>, object: CollectionData) {
        print!("{{");
        for (index, (key, value)) in object.iter(pool).enumerate() {
            if index > 0 {
                print!(",");
            }
            print!("{:?}:", key.unwrap_or_default());
            value.accept(pool, self);
        }
        print!("}}");
    }
}

fn main() -> Result<(), Error> {
    let mut buffer = [0u8; 1024];
    let mut document = Document::new(&mut buffer[..]);
    let root = document.root().ok_or(Error::NoMemory)?;

    document.to_object(root)?;
    let name = document.add_linked_member(root, "name", KeyKind::Static)?;
    document.set_linked_string(name, "greenhouse")?;
    let readings = document.add_member(root, "readings")?;
    document.to_array(readings)?;
    for value in [18.5, 19.0, 19.25] {
        let element = document.add_element(readings)?;
        document.set_float(element, value)?;
    }
    let label = document.add_member(root, "label")?;
    document.set_formatted(label, format_args!("zone-{}", 3))?;
    let offset = document.add_member(root, "offset")?;
    document.set_integer(offset, -2)?;

    print!("Document: ");
    document.root().ok_or(Error::NoMemory)?.accept(document.pool(), &mut Printer);
    println!();

    let last = document.get_element(readings, 2).ok_or(Error::NotACollection)?;
    println!("Last reading vs 19: {:?}", document.compare(last, 19));
    println!("Nesting: {}", document.nesting());
    println!(
        "Used {} of {} bytes",
        document.memory_usage(),
        document.capacity()
    );

    document.remove_member(root, "offset");
    let reclaimed = document.squash();
    println!("Squash reclaimed {} bytes", reclaimed);
    print!("After squash: ");
    document.root().ok_or(Error::NoMemory)?.accept(document.pool(), &mut Printer);
    println!();
    Ok(())
}
