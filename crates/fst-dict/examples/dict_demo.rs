// Quick demo: build a small dictionary, print the compiled program, and
// run the three kinds of search against it.

use fst_dict::{build, Pair};

fn main() {
    let input = vec![
        Pair::new("apple", 1),
        Pair::new("applet", 2),
        Pair::new("apply", 3),
        Pair::new("band", 4),
        Pair::new("band", 5),
        Pair::new("banana", 6),
    ];
    let fst = build(input).expect("dictionary build failed");

    println!("program ({} words):", fst.prog.len());
    println!("{fst}");

    for key in ["apple", "applet", "app", "band", "bandana"] {
        let hits = fst.search(key.as_bytes());
        if hits.is_empty() {
            println!("{key:12} -> (no match)");
        } else {
            println!("{key:12} -> {hits:?}");
        }
    }

    println!();
    for probe in ["applets", "bandana"] {
        match fst.prefix_search(probe.as_bytes()) {
            Some((len, out)) => {
                println!("{probe:12} longest prefix: {:?} {out:?}", &probe[..len])
            }
            None => println!("{probe:12} longest prefix: (none)"),
        }
    }

    println!();
    let probe = "applets";
    for (len, out) in fst.common_prefix_search(probe.as_bytes()) {
        println!("{probe:12} prefix {:?} -> {out:?}", &probe[..len]);
    }
}
