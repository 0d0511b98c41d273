fn main() {
    sympath::cli::run();
}
