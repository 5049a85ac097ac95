// Prints how much text an epub holds and, given a dictionary, its most frequent words.
//
// Arguments
//  1. epub_file
//  2. dictionary (optional): vibrato system.dic.zst

use std::env;
use std::path::Path;

use jpdb_epub_deck::epub::extract_text;
use jpdb_epub_deck::frequency::morphology::VibratoCounter;
use jpdb_epub_deck::frequency::{build_frequency_table, RankedWordList};

const TOP_WORDS: usize = 50;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 && args.len() != 3 {
        eprintln!("Usage: {} <epub_file> [dictionary]", args[0]);
        std::process::exit(1);
    }

    let epub_path = Path::new(&args[1]);
    let book_text = extract_text(epub_path)?;
    println!("Successfully read {} characters", book_text.chars().count());

    if let Some(dictionary) = args.get(2) {
        let counter = VibratoCounter::from_zstd(Path::new(dictionary))?;
        let table = build_frequency_table(&counter, &book_text)?;
        println!("Found {} unique words", table.len());

        let ranked = RankedWordList::from_table(table);
        for ranked_word in ranked.words().iter().take(TOP_WORDS) {
            println!("{:<50} : {}", ranked_word.word, ranked_word.count);
        }
    }

    Ok(())
}
