fn main() {
    arcane_waves::game::run();
}
