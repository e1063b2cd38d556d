use std::env;
mod btm;
mod rbt;
mod utils;

fn usage() { println!("usage: <rbt|btm> <size>") }

fn main() {
  let args: Vec<String> = env::args().collect();
  if args.len() != 3 { usage() }
  else {
    let size = match args[2].parse::<usize>() {
      Ok(size) => size,
      Err(_) => return usage(),
    };
    match args[1].as_ref() {
      "rbt" => rbt::run(size),
      "btm" => btm::run(size),
      _ => usage()
    }
  }
}
